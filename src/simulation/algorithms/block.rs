// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Word-blocked algorithms.
//!
//! Instead of addressing single bits, these set two (occasionally three)
//! bits per 64-bit word and touch `k / 2` words of one cache line, so a
//! query costs one memory access and a handful of word compares.

use super::{bit, bit32};
use crate::hashing::{fastrange32, fastrange64, worm32, worm64, worm64_bits, worm64xtra, GOLDEN64};
use crate::simulation::geometry::Geometry;

/// Visit words `a ^ 0 ..= a ^ (k/2 - 1)` with masks from `pair`.
///
/// `pair(i, third)` yields the two-bit mask for word `i`, plus a third bit
/// when `third` is set (last word, odd k). Requires `k >= 2`.
#[inline(always)]
fn paired_words(
    g: &Geometry,
    a: usize,
    mut pair: impl FnMut(usize, bool) -> u64,
    mut visit: impl FnMut(usize, u64) -> bool,
) -> bool {
    let last = (g.k / 2 - 1) as usize;
    let odd = g.k & 1 == 1;
    for i in 0..=last {
        let mask = pair(i, i == last && odd);
        if !visit(a ^ i, mask) {
            return false;
        }
    }
    true
}

#[inline(always)]
fn dbl_block(g: &Geometry, h: u64, enhanced: bool, visit: impl FnMut(usize, u64) -> bool) -> bool {
    let a = fastrange64(u64::from(g.len_odd), h) as usize;
    let mut b = h as u32;
    if g.k <= 1 {
        let mut visit = visit;
        return visit(a, bit32(b));
    }
    let c = ((h >> 5) as u32) | 1;
    paired_words(
        g,
        a,
        |i, third| {
            let mut mask = bit32(b) | bit32(b.wrapping_add(c));
            let mut next = b.wrapping_add(c.wrapping_mul(2));
            if enhanced {
                next = next.wrapping_add(i as u32);
            }
            if third {
                mask |= bit32(next);
            }
            b = next;
            mask
        },
        visit,
    )
}

#[inline(always)]
fn mul64_block(g: &Geometry, a: usize, mut h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
    if g.k <= 1 {
        let mut visit = visit;
        return visit(a, bit(h));
    }
    paired_words(
        g,
        a,
        |i, third| {
            // Five pairs per multiply.
            if i % 5 == 0 {
                h = h.wrapping_mul(GOLDEN64);
            }
            let mut mask = bit(h) | bit(h >> 6);
            if third {
                mask |= bit(h >> 12);
            }
            h = h.rotate_right(12);
            mask
        },
        visit,
    )
}

/// Two distinct bits per word: `b` from the top six bits, `c` from a
/// worm reduction over the other 63 positions.
#[inline(always)]
fn worm_block(
    g: &Geometry,
    a: usize,
    mut h: u64,
    step: impl Fn(u64, &mut u64) -> u64,
    visit: impl FnMut(usize, u64) -> bool,
) -> bool {
    if g.k <= 1 {
        let mut visit = visit;
        return visit(a, bit(h));
    }
    paired_words(
        g,
        a,
        |_, third| {
            let b = worm64_bits(6, &mut h);
            let mut c = step(63, &mut h);
            c += u64::from(c >= b);
            let mut mask = (1u64 << b) | (1u64 << c);
            if third {
                mask |= 1u64 << (h >> 58);
            }
            mask
        },
        visit,
    )
}

/// Double hashing within each word.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheDblBlock;

impl CacheDblBlock {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        dbl_block(g, h, false, visit)
    }
}

/// Enhanced double hashing within each word.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheEnhdblBlock;

impl CacheEnhdblBlock {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        dbl_block(g, h, true, visit)
    }
}

/// Bit pairs from a golden-ratio multiply, word chosen by fastrange.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMul64Block;

impl CacheMul64Block {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let a = fastrange64(u64::from(g.len_odd), h) as usize;
        mul64_block(g, a, h, visit)
    }
}

/// [`CacheMul64Block`] fed only the low 32 bits of the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMul64BlockFrom32;

impl CacheMul64BlockFrom32 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let h32 = h as u32;
        let a = fastrange32(g.len_odd, h32) as usize;
        mul64_block(g, a, u64::from(h32), visit)
    }
}

/// Worm-reduced bit pairs in each word of the line.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64Block;

impl CacheWorm64Block {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let a = worm64(u64::from(g.len_odd), &mut h) as usize;
        worm_block(g, a, h, worm64, visit)
    }
}

/// [`CacheWorm64Block`] with each index folded back into the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64BlockXtra;

impl CacheWorm64BlockXtra {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let a = worm64xtra(u64::from(g.len_odd), &mut h) as usize;
        worm_block(g, a, h, worm64xtra, visit)
    }
}

/// [`CacheWorm64Block`] starting from the low 32 bits of the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64BlockFrom32;

impl CacheWorm64BlockFrom32 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let mut h32 = h as u32;
        let a = worm32(g.len_odd, &mut h32) as usize;
        worm_block(g, a, GOLDEN64.wrapping_mul(u64::from(h32)), worm64, visit)
    }
}

/// `k / 2` two-bit words, then a single-bit word of its own when k is odd.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64BlockAlt;

impl CacheWorm64BlockAlt {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
        let a = worm64(u64::from(g.len_odd), &mut h) as usize;
        let pairs = (g.k / 2) as usize;
        for i in 0..pairs {
            let b = worm64_bits(6, &mut h);
            let mut c = worm64(63, &mut h);
            c += u64::from(c >= b);
            if !visit(a ^ i, (1u64 << b) | (1u64 << c)) {
                return false;
            }
        }
        if g.k & 1 == 1 {
            let b = worm64_bits(6, &mut h);
            return visit(a ^ pairs, 1u64 << b);
        }
        true
    }
}

/// Shared body of the blockpair variants: `k / 2` consecutive words from
/// `start`, two bits each from successive 12-bit slices of `h`.
#[inline(always)]
fn consecutive_pairs(g: &Geometry, start: usize, mut h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
    for i in 0..g.k_2 as usize {
        if !visit(start + i, bit(h) | bit(h >> 6)) {
            return false;
        }
        h >>= 12;
    }
    true
}

/// Worm-selected run of `k / 2` consecutive words.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64Blockpair;

impl CacheWorm64Blockpair {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let start = u64::from(g.k_2) * worm64(u64::from(g.len_k_2_odd), &mut h);
        consecutive_pairs(g, start as usize, h, visit)
    }
}

/// Fastrange-selected run of `k / 2` consecutive words.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMul64Blockpair;

impl CacheMul64Blockpair {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let start = u64::from(g.k_2) * fastrange64(u64::from(g.len_k_2), h);
        consecutive_pairs(g, start as usize, h.wrapping_mul(GOLDEN64), visit)
    }
}

/// All k bits in one word.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheBlock64;

impl CacheBlock64 {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
        let a = worm64(u64::from(g.len_odd), &mut h) as usize;
        let mut mask = 0u64;
        for _ in 0..g.k {
            mask |= bit(h);
            h = h.rotate_right(6);
        }
        visit(a, mask)
    }
}

selector_from_word_probes!(
    CacheDblBlock,
    CacheEnhdblBlock,
    CacheMul64Block,
    CacheMul64BlockFrom32,
    CacheWorm64Block,
    CacheWorm64BlockXtra,
    CacheWorm64BlockFrom32,
    CacheWorm64BlockAlt,
    CacheWorm64Blockpair,
    CacheMul64Blockpair,
    CacheBlock64,
);
