//! Bloom Lab Library
//!
//! Tools for measuring how Bloom filter bit-selection strategies behave in
//! practice: a false-positive simulator over dozens of algorithms, and two
//! probes that examine the multiplicative hashing they are built on.
//!
//! # Architecture
//!
//! - [`hashing`]: mixing, range reduction and worm hashing primitives
//! - [`data_structures`]: the bit table every algorithm writes into
//! - [`simulation`]: algorithms, geometry, the run loop and reports
//! - [`probes`]: entropy and cycle experiments
//! - [`config`] and [`error`]: layered configuration and error types
//!
//! The binary wires these together behind a command-line interface.

pub mod config;
pub mod data_structures;
pub mod error;
pub mod hashing;
pub mod probes;
pub mod simulation;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;
