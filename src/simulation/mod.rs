// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! False-positive simulation.
//!
//! Builds Bloom-filter-shaped bit tables with a chosen bit-selection
//! algorithm, queries them with keys that were never added and compares
//! the sampled false-positive rate with the standard model.

pub mod algorithms;
pub mod compare;
pub mod fp_model;
pub mod geometry;
pub mod report;
pub mod runner;

pub use algorithms::{Algorithm, BitSelector, Family};
pub use compare::{compare, CompareOutcome, Skipped};
pub use geometry::Geometry;
pub use report::SimulationReport;
pub use runner::{simulate, Plan, RunStats, SimulationParams};
