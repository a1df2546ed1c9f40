// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Algorithms whose probes may land anywhere in the table.

use super::{bit, BitSelector};
use crate::data_structures::BitTable;
use crate::hashing::{hash64, worm32, worm64};
use crate::simulation::geometry::Geometry;

/// Baseline with no real bit selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct Noop;

impl BitSelector for Noop {
    #[inline(always)]
    fn add(&self, table: &mut BitTable, _geometry: &Geometry, h: u64) {
        table.or_word(0, h);
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, _geometry: &Geometry, h: u64) -> bool {
        table.word(0) & h != 0
    }
}

/// Each probe is a fresh worm64 reduction over `[0, m_odd)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Worm64;

impl BitSelector for Worm64 {
    #[inline(always)]
    fn add(&self, table: &mut BitTable, g: &Geometry, mut h: u64) {
        for _ in 0..g.k {
            table.set(worm64(u64::from(g.m_odd), &mut h));
        }
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, g: &Geometry, mut h: u64) -> bool {
        (0..g.k).all(|_| table.test(worm64(u64::from(g.m_odd), &mut h)))
    }
}

/// Worm reduction on the low 32 bits of the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Worm32;

impl BitSelector for Worm32 {
    #[inline(always)]
    fn add(&self, table: &mut BitTable, g: &Geometry, h: u64) {
        let mut h = h as u32;
        for _ in 0..g.k {
            table.set(u64::from(worm32(g.m_odd, &mut h)));
        }
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, g: &Geometry, h: u64) -> bool {
        let mut h = h as u32;
        (0..g.k).all(|_| table.test(u64::from(worm32(g.m_odd, &mut h))))
    }
}

/// Odd probes use worm64, even probes read word and bit off the top of the
/// hash and then rotate it by `64 - log2(m)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Worm64AndRotPow2;

impl Worm64AndRotPow2 {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
        let mut i = 1;
        loop {
            let a = worm64(u64::from(g.m_odd), &mut h);
            if !visit((a >> 6) as usize, bit(a)) {
                return false;
            }
            if i >= g.k {
                return true;
            }
            i += 1;
            let word = (h >> g.bits_64_minus_len) as usize;
            let shift = (h >> g.bits_64_minus_m) & 63;
            if !visit(word, 1u64 << shift) {
                return false;
            }
            if i >= g.k {
                return true;
            }
            h = h.rotate_right(g.bits_64_minus_m);
            i += 1;
        }
    }
}

selector_from_word_probes!(Worm64AndRotPow2);

/// Word from bits 6.., bit from bits 0..6, rotate by 39 between probes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotPow2;

impl BitSelector for RotPow2 {
    #[inline(always)]
    fn add(&self, table: &mut BitTable, g: &Geometry, mut h: u64) {
        for _ in 0..g.k {
            table.or_word(((h >> 6) & u64::from(g.len_mask)) as usize, bit(h));
            h = h.rotate_right(39);
        }
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, g: &Geometry, mut h: u64) -> bool {
        for _ in 0..g.k {
            if !table.contains_mask(((h >> 6) & u64::from(g.len_mask)) as usize, bit(h)) {
                return false;
            }
            h = h.rotate_right(39);
        }
        true
    }
}

/// Like [`RotPow2`] but takes the word index from the top bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotPow2Alt;

impl RotPow2Alt {
    #[inline(always)]
    fn probe(g: &Geometry, h: u64) -> (usize, u64) {
        let word = (h >> g.bits_64_minus_len) as usize;
        let shift = (h >> g.bits_64_minus_m) & 63;
        (word, 1u64 << shift)
    }
}

impl BitSelector for RotPow2Alt {
    #[inline(always)]
    fn add(&self, table: &mut BitTable, g: &Geometry, mut h: u64) {
        for _ in 0..g.k {
            let (word, mask) = Self::probe(g, h);
            table.or_word(word, mask);
            h = h.rotate_right(39);
        }
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, g: &Geometry, mut h: u64) -> bool {
        for _ in 0..g.k {
            let (word, mask) = Self::probe(g, h);
            if !table.contains_mask(word, mask) {
                return false;
            }
            h = h.rotate_right(39);
        }
        true
    }
}

/// One full rehash per probe, seeded with the probe number.
#[derive(Debug, Default, Clone, Copy)]
pub struct Xxhash64Pow2;

impl BitSelector for Xxhash64Pow2 {
    #[inline(always)]
    fn add(&self, table: &mut BitTable, g: &Geometry, v: u64) {
        for seed in 1..=u64::from(g.k) {
            let h = hash64(v, seed);
            table.or_word(((h >> 6) & u64::from(g.len_mask)) as usize, bit(h));
        }
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, g: &Geometry, v: u64) -> bool {
        (1..=u64::from(g.k)).all(|seed| {
            let h = hash64(v, seed);
            table.contains_mask(((h >> 6) & u64::from(g.len_mask)) as usize, bit(h))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_uses_word_zero_only() {
        let g = Geometry::new(4096, 6).unwrap();
        let mut table = BitTable::with_words(g.len as usize).unwrap();
        Noop.add(&mut table, &g, 0b1000);
        assert_eq!(table.word(0), 0b1000);
        assert_eq!(table.count_ones(), 1);
        assert!(Noop.query(&table, &g, 0b1100));
        assert!(!Noop.query(&table, &g, 0b0100));
    }

    #[test]
    fn test_worm64_sets_at_most_k_bits_below_m() {
        let g = Geometry::new(1000, 7).unwrap();
        let mut table = BitTable::with_words(g.len as usize).unwrap();
        Worm64.add(&mut table, &g, 0xdead_beef_f00d_cafe);
        assert!(table.count_ones() <= 7);
        assert!((1000..table.bits()).all(|b| !table.test(b)));
    }

    #[test]
    fn test_rot_pow2_single_probe_position() {
        let g = Geometry::new(1 << 12, 1).unwrap();
        let mut table = BitTable::with_words(g.len as usize).unwrap();
        let h = (5u64 << 6) | 17;
        RotPow2.add(&mut table, &g, h);
        assert!(table.test(5 * 64 + 17));
        assert_eq!(table.count_ones(), 1);
    }

    #[test]
    fn test_rot_pow2_alt_uses_top_bits() {
        let g = Geometry::new(1 << 12, 1).unwrap();
        let mut table = BitTable::with_words(g.len as usize).unwrap();
        // Top 6 bits select the word, the next 6 the bit.
        let h = (3u64 << 58) | (9u64 << 52);
        RotPow2Alt.add(&mut table, &g, h);
        assert!(table.test(3 * 64 + 9));
    }

    #[test]
    fn test_worm64_and_rot_pow2_alternates() {
        let g = Geometry::new(1 << 12, 2).unwrap();
        let mut table = BitTable::with_words(g.len as usize).unwrap();
        Worm64AndRotPow2.add(&mut table, &g, 0x0123_4567_89ab_cdef);
        let ones = table.count_ones();
        assert!((1..=2).contains(&ones));
        assert!(Worm64AndRotPow2.query(&table, &g, 0x0123_4567_89ab_cdef));
    }

    #[test]
    fn test_xxhash_probes_stay_in_table() {
        let g = Geometry::new(1 << 10, 10).unwrap();
        let mut table = BitTable::with_words(g.len as usize).unwrap();
        for v in 0..50 {
            Xxhash64Pow2.add(&mut table, &g, v);
        }
        assert!((0..50).all(|v| Xxhash64Pow2.query(&table, &g, v)));
    }
}
