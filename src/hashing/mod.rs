// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Hashing primitives shared by the bit-selection algorithms and the probes.
//!
//! Everything in here is a handful of arithmetic operations. The functions are
//! split by concern:
//!
//! - [`mix`]: turning input values into well distributed 64-bit or 32-bit hashes
//! - [`range`]: mapping a hash onto `[0, a)` by widening multiplication, with or
//!   without carrying the low word forward ("worm" hashing)
//! - [`numeric`]: small integer helpers used when sizing tables and multipliers
//!
//! # Example
//!
//! ```
//! use bloom_lab_lib::hashing::{fastrange64, hash64, worm64};
//!
//! let mut h = hash64(42, 0);
//! let first = worm64(1000, &mut h);
//! let second = worm64(1000, &mut h);
//! assert!(first < 1000 && second < 1000);
//! assert!(fastrange64(1000, hash64(7, 0)) < 1000);
//! ```

mod mix;
mod numeric;
mod range;

pub use mix::{hash64, mix32, GOLDEN64};
pub use numeric::{nearest_prime, round_up_to_pow2};
pub use range::{fastrange32, fastrange64, wide_mul, worm32, worm64, worm64_bits, worm64xtra};
