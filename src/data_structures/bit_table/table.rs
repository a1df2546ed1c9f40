// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Main implementation of the bit table.

use crate::data_structures::bit_table::error::{BitTableError, Result};

/// Number of 32-bit lanes in a 256-bit block.
pub const LANES: usize = 8;

/// Number of 64-bit words in a 256-bit block.
const WORDS_PER_BLOCK: usize = 4;

/// A fixed-size bit set stored as 64-bit words.
///
/// Bit `i` lives in word `i >> 6` at position `i & 63`. Because words are
/// little-endian on every platform the simulations target, this is the same
/// layout as addressing byte `i >> 3` at bit `i & 7`, which is what the
/// byte-oriented algorithms assume.
///
/// The table does no bounds arithmetic of its own. Callers are expected to
/// stay inside `0..bits()`, and indexing outside panics.
///
/// # Examples
///
/// ```
/// use bloom_lab_lib::data_structures::bit_table::BitTable;
///
/// let mut table = BitTable::with_words(8).unwrap();
/// table.set(130);
/// assert!(table.test(130));
/// assert!(!table.test(131));
///
/// table.clear();
/// assert_eq!(table.count_ones(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct BitTable {
    words: Vec<u64>,
}

impl BitTable {
    /// Create a zeroed table with `len` words.
    pub fn with_words(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(BitTableError::ZeroSize);
        }
        if len.checked_mul(64).is_none() {
            return Err(BitTableError::TooLarge((len as u64).saturating_mul(64)));
        }
        Ok(Self {
            words: vec![0; len],
        })
    }

    /// Create a zeroed table able to hold at least `bits` bits.
    pub fn with_bits(bits: u64) -> Result<Self> {
        if bits == 0 {
            return Err(BitTableError::ZeroSize);
        }
        let len = usize::try_from(bits.div_ceil(64)).map_err(|_| BitTableError::TooLarge(bits))?;
        Self::with_words(len)
    }

    /// Reset every bit to zero.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Set bit `bit`.
    #[inline(always)]
    pub fn set(&mut self, bit: u64) {
        self.words[(bit >> 6) as usize] |= 1u64 << (bit & 63);
    }

    /// Returns true if bit `bit` is set.
    #[inline(always)]
    pub fn test(&self, bit: u64) -> bool {
        self.words[(bit >> 6) as usize] & (1u64 << (bit & 63)) != 0
    }

    /// Set bit `bit` and report whether it was already set.
    #[inline]
    pub fn test_and_set(&mut self, bit: u64) -> bool {
        let word = &mut self.words[(bit >> 6) as usize];
        let mask = 1u64 << (bit & 63);
        let was_set = *word & mask != 0;
        *word |= mask;
        was_set
    }

    /// OR `mask` into word `index`.
    #[inline(always)]
    pub fn or_word(&mut self, index: usize, mask: u64) {
        self.words[index] |= mask;
    }

    /// Returns true if every bit of `mask` is set in word `index`.
    #[inline(always)]
    pub fn contains_mask(&self, index: usize, mask: u64) -> bool {
        self.words[index] & mask == mask
    }

    /// Read word `index`.
    #[inline(always)]
    pub fn word(&self, index: usize) -> u64 {
        self.words[index]
    }

    /// OR eight 32-bit lane masks into 256-bit block `block`.
    ///
    /// Lane `j` occupies bits `32 * j .. 32 * j + 32` of the block.
    #[inline(always)]
    pub fn or_lanes(&mut self, block: usize, lanes: &[u32; LANES]) {
        let base = block * WORDS_PER_BLOCK;
        for (offset, pair) in lanes.chunks_exact(2).enumerate() {
            self.words[base + offset] |= u64::from(pair[0]) | (u64::from(pair[1]) << 32);
        }
    }

    /// Returns true if every bit of the eight lane masks is set in block `block`.
    #[inline(always)]
    pub fn contains_lanes(&self, block: usize, lanes: &[u32; LANES]) -> bool {
        let base = block * WORDS_PER_BLOCK;
        lanes.chunks_exact(2).enumerate().all(|(offset, pair)| {
            let mask = u64::from(pair[0]) | (u64::from(pair[1]) << 32);
            self.words[base + offset] & mask == mask
        })
    }

    /// Number of words in the table.
    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    /// Number of addressable bits.
    pub fn bits(&self) -> u64 {
        self.words.len() as u64 * 64
    }

    /// Count of set bits.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Fraction of bits that are set, between 0.0 and 1.0.
    pub fn fill_ratio(&self) -> f64 {
        self.count_ones() as f64 / self.bits() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(BitTable::with_words(0).unwrap_err(), BitTableError::ZeroSize);
        assert_eq!(BitTable::with_bits(0).unwrap_err(), BitTableError::ZeroSize);
    }

    #[test]
    fn test_with_bits_rounds_up() {
        assert_eq!(BitTable::with_bits(1).unwrap().len_words(), 1);
        assert_eq!(BitTable::with_bits(64).unwrap().len_words(), 1);
        assert_eq!(BitTable::with_bits(65).unwrap().len_words(), 2);
    }

    #[test]
    fn test_set_and_test() {
        let mut table = BitTable::with_words(4).unwrap();
        for bit in [0, 1, 63, 64, 200, 255] {
            assert!(!table.test(bit));
            table.set(bit);
            assert!(table.test(bit));
        }
        assert_eq!(table.count_ones(), 6);
        assert_eq!(table.word(0), 1 | 2 | (1 << 63));
    }

    #[test]
    fn test_test_and_set() {
        let mut table = BitTable::with_words(1).unwrap();
        assert!(!table.test_and_set(5));
        assert!(table.test_and_set(5));
    }

    #[test]
    fn test_clear() {
        let mut table = BitTable::with_words(16).unwrap();
        for bit in (0..1024).step_by(7) {
            table.set(bit);
        }
        assert!(table.fill_ratio() > 0.0);
        table.clear();
        assert_eq!(table.count_ones(), 0);
        assert_eq!(table.fill_ratio(), 0.0);
    }

    #[test]
    fn test_word_masks() {
        let mut table = BitTable::with_words(2).unwrap();
        table.or_word(1, 0b1010);
        assert!(table.contains_mask(1, 0b1000));
        assert!(table.contains_mask(1, 0b1010));
        assert!(!table.contains_mask(1, 0b1110));
        assert!(table.test(64 + 1));
        assert!(table.test(64 + 3));
    }

    #[test]
    fn test_lane_layout_matches_bit_addressing() {
        let mut table = BitTable::with_words(8).unwrap();
        let mut lanes = [0u32; LANES];
        lanes[0] = 1;
        lanes[3] = 1 << 31;
        lanes[7] = 1 << 4;
        table.or_lanes(1, &lanes);

        // Block 1 starts at bit 256.
        assert!(table.test(256));
        assert!(table.test(256 + 3 * 32 + 31));
        assert!(table.test(256 + 7 * 32 + 4));
        assert_eq!(table.count_ones(), 3);
        assert!(table.contains_lanes(1, &lanes));
        assert!(!table.contains_lanes(0, &lanes));
    }
}
