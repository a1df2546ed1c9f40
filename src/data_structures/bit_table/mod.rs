// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bit table backing every simulated filter.
//!
//! A plain array of 64-bit words used as a bit set. The simulations allocate
//! one table per run and clear it in place each time a new structure is
//! populated, so the table exposes word and 256-bit block level access in
//! addition to single bits.
//!
//! # Example
//!
//! ```
//! use bloom_lab_lib::data_structures::bit_table::BitTable;
//!
//! let mut table = BitTable::with_bits(1024).unwrap();
//! table.set(7);
//! table.or_word(3, 0b11);
//!
//! assert!(table.test(7));
//! assert!(table.contains_mask(3, 0b01));
//! assert_eq!(table.count_ones(), 3);
//! ```

// Module declarations
mod error;
mod table;

// Re-exports
pub use error::{BitTableError, Result};
pub use table::{BitTable, LANES};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut table = BitTable::with_bits(512).unwrap();
        assert_eq!(table.bits(), 512);

        table.set(0);
        table.set(511);

        assert!(table.test(0));
        assert!(table.test(511));
        assert!(!table.test(256));
    }
}
