// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bit selection as done by RocksDB's dynamic Bloom filter.
//!
//! All four work from the low 32 bits of the key hash and step with a
//! `delta` of the hash rotated right by 17.

use crate::hashing::fastrange32;
use crate::simulation::geometry::{Geometry, CACHE_LINE_BITS};

#[inline(always)]
fn delta(h: u32) -> u32 {
    h.rotate_right(17)
}

/// Probes anywhere in `[0, m_odd)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RocksdbDynamic;

impl RocksdbDynamic {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, mut visit: impl FnMut(u64) -> bool) -> bool {
        let mut h = h as u32;
        let delta = delta(h);
        for _ in 0..g.k {
            if !visit(u64::from(h % g.m_odd)) {
                return false;
            }
            h = h.wrapping_add(delta);
        }
        true
    }
}

/// Probes within the 512-bit line starting at bit `line_start`, rotating
/// the hash by nine bits between probes so each uses fresh bits.
#[inline(always)]
fn within_line(g: &Geometry, mut h: u32, line_start: u32, mut visit: impl FnMut(u64) -> bool) -> bool {
    let delta = delta(h);
    let line_start = u64::from(line_start);
    for _ in 0..g.k {
        if !visit(line_start + u64::from(h % CACHE_LINE_BITS)) {
            return false;
        }
        h = (h / CACHE_LINE_BITS).wrapping_add((h % CACHE_LINE_BITS).wrapping_mul(0x2000_0000 / 64));
        h = h.wrapping_add(delta);
    }
    true
}

/// Line chosen by modulo of the hash rotated right by 11.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheRocksdbDynamic;

impl CacheRocksdbDynamic {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        let h = h as u32;
        let line = h.rotate_right(11) % g.cache_len;
        within_line(g, h, line * CACHE_LINE_BITS, visit)
    }
}

/// Line chosen by fastrange of the hash rotated right by 11.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheRocksdbDynamicFastrange;

impl CacheRocksdbDynamicFastrange {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        let h = h as u32;
        let line = fastrange32(g.cache_len, h.rotate_right(11));
        within_line(g, h, line * CACHE_LINE_BITS, visit)
    }
}

/// Line chosen by fastrange of the unrotated hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheRocksdbDynamicFastrange2;

impl CacheRocksdbDynamicFastrange2 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        let h = h as u32;
        let line = fastrange32(g.cache_len, h);
        within_line(g, h, line * CACHE_LINE_BITS, visit)
    }
}

selector_from_bit_probes!(
    RocksdbDynamic,
    CacheRocksdbDynamic,
    CacheRocksdbDynamicFastrange,
    CacheRocksdbDynamicFastrange2,
);
