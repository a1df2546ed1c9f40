// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Range reduction by widening multiplication.
//!
//! `fastrange` maps `h` onto `[0, a)` as the upper word of `a * h`. The
//! "worm" variants return the same upper word but also hand the lower word
//! back to the caller as the next hash, so one 64-bit hash can feed many
//! range reductions in sequence.

/// Full 128-bit product of `a` and `h`, returned as `(upper, lower)`.
#[inline(always)]
pub fn wide_mul(a: u64, h: u64) -> (u64, u64) {
    let wide = u128::from(a) * u128::from(h);
    ((wide >> 64) as u64, wide as u64)
}

/// Map `h` uniformly onto `[0, a)`.
#[inline(always)]
pub fn fastrange64(a: u64, h: u64) -> u64 {
    wide_mul(a, h).0
}

/// 32-bit counterpart of [`fastrange64`].
#[inline(always)]
pub fn fastrange32(a: u32, h: u32) -> u32 {
    ((u64::from(a) * u64::from(h)) >> 32) as u32
}

/// Map `h` onto `[0, a)` and replace `h` with the low word of the product.
#[inline(always)]
pub fn worm64(a: u64, h: &mut u64) -> u64 {
    let (upper, lower) = wide_mul(a, *h);
    *h = lower;
    upper
}

/// Like [`worm64`], but folds the returned index back into the carried hash.
#[inline(always)]
pub fn worm64xtra(a: u64, h: &mut u64) -> u64 {
    let (upper, lower) = wide_mul(a, *h);
    *h = lower.wrapping_add(upper);
    upper
}

/// 32-bit counterpart of [`worm64`].
#[inline(always)]
pub fn worm32(a: u32, h: &mut u32) -> u32 {
    let product = u64::from(a) * u64::from(*h);
    *h = product as u32;
    (product >> 32) as u32
}

/// Take the top `nbits` bits of `h` and rotate them to the bottom.
///
/// `nbits` must be in `1..64`.
#[inline(always)]
pub fn worm64_bits(nbits: u32, h: &mut u64) -> u64 {
    debug_assert!(nbits > 0 && nbits < 64);
    let rv = *h >> (64 - nbits);
    *h = h.rotate_left(nbits);
    rv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_mul() {
        assert_eq!(wide_mul(u64::MAX, u64::MAX), (u64::MAX - 1, 1));
        assert_eq!(wide_mul(1 << 32, 1 << 32), (1, 0));
        assert_eq!(wide_mul(3, 5), (0, 15));
    }

    #[test]
    fn test_fastrange_bounds() {
        assert_eq!(fastrange64(100, 0), 0);
        assert_eq!(fastrange64(100, u64::MAX), 99);
        assert_eq!(fastrange32(100, u32::MAX), 99);
        assert_eq!(fastrange32(100, 1 << 31), 50);
        assert_eq!(fastrange64(0, u64::MAX), 0);
    }

    #[test]
    fn test_worm64_carries_low_word() {
        let mut h = u64::MAX;
        let a = worm64(3, &mut h);
        assert_eq!(a, 2);
        // 3 * (2^64 - 1) = 2 * 2^64 + (2^64 - 3)
        assert_eq!(h, u64::MAX - 2);
    }

    #[test]
    fn test_worm64xtra_adds_index_back() {
        let mut plain = 0xdead_beef_cafe_f00d_u64;
        let mut xtra = plain;
        let a = worm64(1000, &mut plain);
        let b = worm64xtra(1000, &mut xtra);
        assert_eq!(a, b);
        assert_eq!(xtra, plain.wrapping_add(a));
    }

    #[test]
    fn test_worm32_carries_low_word() {
        let mut h = 0x8000_0001u32;
        let a = worm32(4, &mut h);
        assert_eq!(a, 2);
        assert_eq!(h, 4);
    }

    #[test]
    fn test_worm64_bits_rotates() {
        let mut h = 0xfc00_0000_0000_0001u64;
        let top = worm64_bits(6, &mut h);
        assert_eq!(top, 63);
        assert_eq!(h, (1 << 6) | 63);
    }

    #[test]
    fn test_worm64_sequence_stays_in_range() {
        let mut h = 0x1234_5678_9abc_def0_u64;
        for _ in 0..32 {
            assert!(worm64(12_345_679, &mut h) < 12_345_679);
        }
    }
}
