// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Standalone experiments on the arithmetic behind the bit-selection
//! algorithms.
//!
//! - [`entropy`]: how much entropy chained multiplicative hashing keeps
//! - [`cycles`]: which table sizes make worm hashing cycle

pub mod cycles;
pub mod entropy;

pub use cycles::{cycle_after, CycleEvent, CycleFinding, CycleScan, WordWidth};
pub use entropy::{EntropyParams, EntropyProbe, SameOutcome, VariousOutcome};
