//! Data structures for Bloom Lab.
//!
//! The simulations only ever need one structure: a flat bit table that the
//! bit-selection algorithms write into and read from.

pub mod bit_table;

pub use bit_table::{BitTable, BitTableError};
