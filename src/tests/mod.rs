//! Crate-level test modules for Bloom Lab.
//!
//! Unit tests live next to the code they cover. The modules here exercise
//! behavior that cuts across components:
//! - Configuration loading through files and environment variables
//! - Error conversion and reporting
//! - Property-based checks over every bit-selection algorithm
//! - Shared fixtures and strategies

pub mod config_tests;
pub mod error_tests;

pub use test_utils::{algorithm_strategy, geometry_for, hash_strategy, TestFixture};
