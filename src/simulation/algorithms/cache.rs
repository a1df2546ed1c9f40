// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Cache-local algorithms.
//!
//! Every probe for a key stays inside one 512-bit cache line (or, for the
//! `local-*` variants, inside a short window that may straddle two).

use super::bit;
use crate::hashing::{fastrange64, worm64, worm64xtra, GOLDEN64};
use crate::simulation::geometry::Geometry;

/// Multiplier spreading a 32-bit hash across 64 bits.
const FROM32_MULTIPLIER: u64 = 9_123_456_789_123_456_789;

/// Bit probes: pick a bit with `start`, then XOR in offsets from `next`
/// so the rest stay in the same 512-bit line.
#[inline(always)]
fn xor_within_line(
    g: &Geometry,
    mut h: u64,
    step: impl Fn(u64, &mut u64) -> u64,
    mut visit: impl FnMut(u64) -> bool,
) -> bool {
    let mut a = step(u64::from(g.m_odd), &mut h);
    if !visit(a) {
        return false;
    }
    for _ in 1..g.k {
        let b = step(511, &mut h);
        // Offset in 1..=511, so the bit always moves.
        a ^= b + 1;
        if !visit(a) {
            return false;
        }
    }
    true
}

/// First bit anywhere, the rest XORed within its line.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64;

impl CacheWorm64 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        xor_within_line(g, h, worm64, visit)
    }
}

/// [`CacheWorm64`] with each index folded back into the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64Xtra;

impl CacheWorm64Xtra {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        xor_within_line(g, h, worm64xtra, visit)
    }
}

/// [`CacheWorm64`] starting from the low 32 bits of the hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64From32;

impl CacheWorm64From32 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(u64) -> bool) -> bool {
        let h = u64::from(h as u32).wrapping_mul(FROM32_MULTIPLIER);
        xor_within_line(g, h, worm64, visit)
    }
}

/// Picks a line, then k independent positions inside it.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheWorm64Alt;

impl CacheWorm64Alt {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, mut visit: impl FnMut(usize, u64) -> bool) -> bool {
        let base = worm64(u64::from(g.cache_len_odd), &mut h) << 3;
        for _ in 0..g.k {
            let pos = worm64(511, &mut h);
            if !visit((base + (pos >> 6)) as usize, bit(pos)) {
                return false;
            }
        }
        true
    }
}

/// Steps forward by 1..=233 bits per probe, wrapping into `1..=m_odd`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalWorm64;

impl LocalWorm64 {
    #[inline(always)]
    fn probes(g: &Geometry, mut h: u64, mut visit: impl FnMut(u64) -> bool) -> bool {
        let m_odd = u64::from(g.m_odd);
        let mut a = worm64(m_odd, &mut h);
        if !visit(a) {
            return false;
        }
        for _ in 1..g.k {
            let b = worm64(233, &mut h);
            a += b + 1;
            // A step may span several laps when `m_odd` is below 234.
            if a > m_odd {
                a = (a - 1) % m_odd + 1;
            }
            if !visit(a) {
                return false;
            }
        }
        true
    }
}

/// Shared loop of the `mul64` variants: seven probes per multiply,
/// rotating by 9 between probes, with `advance` choosing the next word.
#[inline(always)]
fn mul64_probes(
    g: &Geometry,
    mut h: u64,
    advance: impl Fn(u64, u64) -> u64,
    mut visit: impl FnMut(usize, u64) -> bool,
) -> bool {
    let mut a = fastrange64(u64::from(g.len_odd), h);
    let mut i = 0;
    loop {
        h = h.wrapping_mul(GOLDEN64);
        for _ in 0..7 {
            if !visit(a as usize, bit(h)) {
                return false;
            }
            i += 1;
            if i >= g.k {
                return true;
            }
            a = advance(a, (h >> 6) & 7);
            h = h.rotate_right(9);
        }
    }
}

/// Moves forward 0..=7 words per probe, wrapping at `len_odd`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMul64;

impl LocalMul64 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        let len_odd = u64::from(g.len_odd);
        mul64_probes(
            g,
            h,
            |a, step| {
                let next = a + step;
                if next >= len_odd {
                    next - len_odd
                } else {
                    next
                }
            },
            visit,
        )
    }
}

/// XORs the word index within its eight-word line.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMul64;

impl CacheMul64 {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, visit: impl FnMut(usize, u64) -> bool) -> bool {
        mul64_probes(g, h, |a, step| a ^ step, visit)
    }
}

/// Double hashing modulo 512 inside one line.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheDbl;

impl CacheDbl {
    #[inline(always)]
    fn probes(g: &Geometry, h: u64, mut visit: impl FnMut(u64) -> bool) -> bool {
        let line = fastrange64(u64::from(g.cache_len), h) << 9;
        let mut b = (h as u32) & 511;
        let c = ((h >> 8) as u32) | 1;
        for _ in 0..g.k {
            if !visit(line + u64::from(b)) {
                return false;
            }
            b = b.wrapping_add(c) & 511;
        }
        true
    }
}

selector_from_bit_probes!(CacheWorm64, CacheWorm64Xtra, CacheWorm64From32, LocalWorm64, CacheDbl);
selector_from_word_probes!(CacheWorm64Alt, LocalMul64, CacheMul64);

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_bits(
        probes: impl Fn(&Geometry, u64, &mut dyn FnMut(u64) -> bool) -> bool,
        g: &Geometry,
        h: u64,
    ) -> Vec<u64> {
        let mut out = Vec::new();
        probes(g, h, &mut |b| {
            out.push(b);
            true
        });
        out
    }

    fn collect_words(
        probes: impl Fn(&Geometry, u64, &mut dyn FnMut(usize, u64) -> bool) -> bool,
        g: &Geometry,
        h: u64,
    ) -> Vec<usize> {
        let mut out = Vec::new();
        probes(g, h, &mut |w, _| {
            out.push(w);
            true
        });
        out
    }

    #[test]
    fn test_cache_worm64_stays_in_one_line() {
        let g = Geometry::new(1 << 20, 12).unwrap();
        for h in [1u64, 0x1234_5678_9abc_def0, u64::MAX, 0x8000_0000_0000_0001] {
            let bits = collect_bits(|g, h, v| CacheWorm64::probes(g, h, v), &g, h);
            assert_eq!(bits.len(), 12);
            let line = bits[0] >> 9;
            assert!(bits.iter().all(|b| b >> 9 == line));
            // XOR with a non-zero offset never repeats the previous bit.
            assert!(bits.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn test_cache_worm64_alt_stays_in_one_line() {
        let g = Geometry::new(100_000, 9).unwrap();
        for h in [7u64, 0xfeed_face_cafe_beef, u64::MAX] {
            let words = collect_words(|g, h, v| CacheWorm64Alt::probes(g, h, v), &g, h);
            assert_eq!(words.len(), 9);
            let line = words[0] / 8;
            assert!(words.iter().all(|w| w / 8 == line));
            assert!(words.iter().all(|&w| w < g.len as usize));
        }
    }

    #[test]
    fn test_local_worm64_wraps_inside_table() {
        let g = Geometry::new(300, 16).unwrap();
        for h in 0..200u64 {
            let bits = collect_bits(|g, h, v| LocalWorm64::probes(g, h.wrapping_mul(GOLDEN64), v), &g, h);
            assert!(bits.iter().all(|&b| b < g.table_bits()));
        }
    }

    #[test]
    fn test_local_worm64_small_table_stays_below_m_odd() {
        for (m, k) in [(1, 40), (2, 40), (7, 30), (100, 40), (233, 64)] {
            let g = Geometry::new(m, k).unwrap();
            for h in 0..200u64 {
                let bits = collect_bits(|g, h, v| LocalWorm64::probes(g, h.wrapping_mul(GOLDEN64), v), &g, h);
                assert_eq!(bits.len(), k as usize);
                assert!(bits.iter().all(|&b| b <= u64::from(g.m_odd)), "m={m} {bits:?}");
            }
        }
    }

    #[test]
    fn test_local_worm64_large_table_steps_once_around() {
        let g = Geometry::new(1001, 2).unwrap();
        for h in 0..500u64 {
            let bits = collect_bits(|g, h, v| LocalWorm64::probes(g, h.wrapping_mul(GOLDEN64), v), &g, h);
            let step = if bits[1] > bits[0] { bits[1] - bits[0] } else { bits[1] + 1001 - bits[0] };
            assert!((1..=233).contains(&step), "{bits:?}");
        }
    }

    #[test]
    fn test_local_mul64_wraps_inside_table() {
        let g = Geometry::new(512, 20).unwrap();
        for h in 0..200u64 {
            let words = collect_words(|g, h, v| LocalMul64::probes(g, h.wrapping_mul(GOLDEN64), v), &g, h);
            assert_eq!(words.len(), 20);
            assert!(words.iter().all(|&w| w < g.len_odd as usize));
        }
    }

    #[test]
    fn test_cache_mul64_stays_in_one_line() {
        let g = Geometry::new(1 << 16, 15).unwrap();
        let words = collect_words(|g, h, v| CacheMul64::probes(g, h, v), &g, 0xabcdef);
        let line = words[0] / 8;
        assert!(words.iter().all(|w| w / 8 == line));
    }

    #[test]
    fn test_cache_dbl_stays_in_one_line() {
        let g = Geometry::new(5000, 8).unwrap();
        let bits = collect_bits(|g, h, v| CacheDbl::probes(g, h, v), &g, 0x0f0f_1234_5678_9abc);
        assert_eq!(bits.len(), 8);
        let line = bits[0] >> 9;
        assert!(bits.iter().all(|b| b >> 9 == line));
        assert!(line < u64::from(g.cache_len));
    }

    #[test]
    fn test_probes_stop_early() {
        let g = Geometry::new(1 << 16, 8).unwrap();
        let mut seen = 0;
        let complete = CacheWorm64::probes(&g, 42, |_| {
            seen += 1;
            seen < 3
        });
        assert!(!complete);
        assert_eq!(seen, 3);
    }
}
