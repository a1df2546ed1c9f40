// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Double hashing: every probe is derived from two base values, so two keys
//! that agree on both collide on all k bits.

use super::bit;
use crate::hashing::fastrange32;
use crate::simulation::geometry::Geometry;

/// `h + i*b` over a power-of-two table, `b` the upper half of the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct DblPow2;

impl DblPow2 {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
        let b = h >> 32;
        let len_mask = u64::from(g.len_mask);
        for _ in 0..g.k {
            if !visit(((h >> 6) & len_mask) as usize, bit(h)) {
                return false;
            }
            h = h.wrapping_add(b);
        }
        true
    }
}

/// Word index and bit position advance from different halves of the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct DblPow2SplitCheap;

impl DblPow2SplitCheap {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
        let len_mask = u64::from(g.len_mask);
        let mut a = h;
        let b = h.rotate_left(32);
        let mut c = b;
        for _ in 0..g.k {
            if !visit((a & len_mask) as usize, bit(c)) {
                return false;
            }
            a = a.wrapping_add(b);
            c = c.wrapping_add(1);
        }
        true
    }
}

/// Enhanced double hashing: the stride grows by `i` after probe `i`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnhPow2;

impl EnhPow2 {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
        let mut b = h >> 32;
        let len_mask = u64::from(g.len_mask);
        for i in 1..=g.k {
            if !visit(((h >> 6) & len_mask) as usize, bit(h)) {
                return false;
            }
            h = h.wrapping_add(b);
            b = b.wrapping_add(u64::from(i));
        }
        true
    }
}

/// Strided walk modulo `m_odd` from a start index `a`.
#[inline(always)]
fn stride_mod_m_odd(g: &Geometry, mut a: u64, b: u64, mut visit: impl FnMut(u64) -> bool) -> bool {
    let m_odd = u64::from(g.m_odd);
    for _ in 0..g.k {
        if !visit(a) {
            return false;
        }
        a += b;
        if a >= m_odd {
            a -= m_odd;
        }
    }
    true
}

/// Start index by one modulo.
#[derive(Debug, Default, Clone, Copy)]
pub struct DblOneMod;

impl DblOneMod {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        let b = (h >> 32) & u64::from(g.m_mask >> 1);
        let a = u64::from(h as u32 % g.m_odd);
        stride_mod_m_odd(g, a, b, visit)
    }
}

/// Start index by one fastrange.
#[derive(Debug, Default, Clone, Copy)]
pub struct DblOneFastrange32;

impl DblOneFastrange32 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        let b = (h >> 32) & u64::from(g.m_mask >> 1);
        let a = u64::from(fastrange32(g.m_odd, h as u32));
        stride_mod_m_odd(g, a, b, visit)
    }
}

/// Double hashing in 32-bit hash space; each probe is reduced separately.
#[derive(Debug, Default, Clone, Copy)]
pub struct DblPreimageFastrange32;

impl DblPreimageFastrange32 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, mut visit: impl FnMut(u64) -> bool) -> bool {
        let b = (h >> 32) as u32;
        let mut a = h as u32;
        for _ in 0..g.k {
            if !visit(u64::from(fastrange32(g.m_odd, a))) {
                return false;
            }
            a = a.wrapping_add(b);
        }
        true
    }
}

selector_from_word_probes!(DblPow2, DblPow2SplitCheap, EnhPow2);
selector_from_bit_probes!(DblOneMod, DblOneFastrange32, DblPreimageFastrange32);
