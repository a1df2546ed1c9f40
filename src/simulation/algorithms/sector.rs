// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! 256-bit sector algorithms.
//!
//! A key maps to one 256-bit block, split into eight 32-bit lanes, and sets
//! at most one bit per lane. The lane arithmetic is written over `[u32; 8]`
//! so the compiler can vectorize it; the resulting bit layout matches an
//! AVX2 implementation on little-endian targets.

use super::BitSelector;
use crate::data_structures::{bit_table::LANES, BitTable};
use crate::hashing::fastrange32;
use crate::simulation::geometry::Geometry;

/// Per-lane remix multipliers for [`CacheSimdFastrange32`].
const MULTIPLIERS: [u32; LANES] = [
    1 << 0,
    1 << 5,
    1 << 10,
    1 << 15,
    1 << 20,
    1_628_273 << 0,
    1_628_273 << 5,
    1_628_273 << 10,
];

/// Per-lane remix multipliers for [`CacheSimdFastrange32K8`].
const K8_MULTIPLIERS: [u32; LANES] = [
    -1_545_148_375i32 as u32,
    939_189_041,
    1_323_509_755,
    -1_969_823_245i32 as u32,
    574_551_977,
    -1_487_628_273i32 as u32,
    -1_264_161_019i32 as u32,
    -1_720_001_801i32 as u32,
];

/// Block index and remixed hash for a key.
#[inline(always)]
fn locate(g: &Geometry, h: u64) -> (usize, u32) {
    let h = h as u32;
    (fastrange32(g.cache256_len, h) as usize, h)
}

/// Up to eight bits, one per lane; which lanes are used rotates with the
/// low three bits of the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheSimdFastrange32 {
    k_selector: [u32; LANES],
}

impl CacheSimdFastrange32 {
    #[inline(always)]
    fn lanes(&self, h: u32) -> [u32; LANES] {
        let mut out = [0u32; LANES];
        for (lane, out) in out.iter_mut().enumerate() {
            let selected = self.k_selector[(lane as u32).wrapping_add(h) as usize & 7];
            let shift = h.wrapping_mul(MULTIPLIERS[lane]) >> 27;
            *out = selected << shift;
        }
        out
    }
}

impl BitSelector for CacheSimdFastrange32 {
    fn prepare(g: &Geometry) -> Self {
        let mut k_selector = [0u32; LANES];
        for (lane, selector) in k_selector.iter_mut().enumerate() {
            *selector = u32::from(g.k > lane as u32);
        }
        Self { k_selector }
    }

    #[inline(always)]
    fn add(&self, table: &mut BitTable, g: &Geometry, h: u64) {
        let (block, h) = locate(g, h);
        table.or_lanes(block, &self.lanes(h.wrapping_mul(0x9e37_79b9)));
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, g: &Geometry, h: u64) -> bool {
        let (block, h) = locate(g, h);
        table.contains_lanes(block, &self.lanes(h.wrapping_mul(0x9e37_79b9)))
    }
}

/// Exactly one bit in every lane.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheSimdFastrange32K8;

impl CacheSimdFastrange32K8 {
    #[inline(always)]
    fn lanes(h: u32) -> [u32; LANES] {
        let mut out = [0u32; LANES];
        for (out, multiplier) in out.iter_mut().zip(K8_MULTIPLIERS) {
            *out = 1 << (h.wrapping_mul(multiplier) >> 27);
        }
        out
    }
}

impl BitSelector for CacheSimdFastrange32K8 {
    #[inline(always)]
    fn add(&self, table: &mut BitTable, g: &Geometry, h: u64) {
        let (block, h) = locate(g, h);
        table.or_lanes(block, &Self::lanes(h.rotate_left(21)));
    }

    #[inline(always)]
    fn query(&self, table: &BitTable, g: &Geometry, h: u64) -> bool {
        let (block, h) = locate(g, h);
        table.contains_lanes(block, &Self::lanes(h.rotate_left(21)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_selector_enables_k_lanes() {
        for k in 1..=8 {
            let g = Geometry::new(1 << 12, k).unwrap();
            let selector = CacheSimdFastrange32::prepare(&g);
            assert_eq!(selector.k_selector.iter().sum::<u32>(), k);
            for h in [0u32, 1, 7, 0xffff_ffff, 0x1234_5678] {
                let lanes = selector.lanes(h);
                let set: u32 = lanes.iter().map(|l| l.count_ones()).sum();
                assert_eq!(set, k);
            }
        }
    }

    #[test]
    fn test_k8_sets_every_lane() {
        for h in [0u32, 3, 0xdead_beef, u32::MAX] {
            let lanes = CacheSimdFastrange32K8::lanes(h);
            assert!(lanes.iter().all(|l| l.count_ones() == 1));
        }
    }

    #[test]
    fn test_sector_touches_one_block() {
        let g = Geometry::new(10_000, 8).unwrap();
        let selector = CacheSimdFastrange32::prepare(&g);
        let mut table = BitTable::with_words(g.len as usize).unwrap();
        selector.add(&mut table, &g, 0x0bad_cafe);
        let touched: Vec<usize> = (0..g.len as usize).filter(|&w| table.word(w) != 0).collect();
        assert!(!touched.is_empty());
        assert!(touched.iter().all(|w| w / 4 == touched[0] / 4));
        assert_eq!(table.count_ones(), 8);
    }
}
