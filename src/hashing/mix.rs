// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Value hashing and remixing.

use xxhash_rust::xxh64::xxh64;

/// 64-bit golden ratio constant, used to remix a hash after part of it was consumed.
pub const GOLDEN64: u64 = 0x9e37_79b9_7f4a_7c13;

/// Multiplier used by [`mix32`].
const MIX32_MULTIPLIER: u32 = 123_456_789;

/// Hash a 64-bit value with XXH64 over its little-endian bytes.
///
/// The simulation always hashes with seed 0. Non-zero seeds give the
/// independent hash functions used by the `xxhash64-pow2` algorithm.
#[inline]
pub fn hash64(value: u64, seed: u64) -> u64 {
    xxh64(&value.to_le_bytes(), seed)
}

/// Cheap 32-bit mixer: three multiplications separated by rotations.
///
/// Good enough to turn an arithmetic progression of start values into
/// unrelated inputs for the entropy probe.
#[inline]
pub fn mix32(mut v: u32) -> u32 {
    v = v.wrapping_mul(MIX32_MULTIPLIER);
    v = v.rotate_left(11);
    v = v.wrapping_mul(MIX32_MULTIPLIER);
    v = v.rotate_left(11);
    v.wrapping_mul(MIX32_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hash64_is_deterministic() {
        assert_eq!(hash64(12345, 0), hash64(12345, 0));
        assert_ne!(hash64(12345, 0), hash64(12345, 1));
        assert_ne!(hash64(12345, 0), hash64(12346, 0));
    }

    #[test]
    fn test_hash64_matches_xxh64_of_le_bytes() {
        let v = 0x0102_0304_0506_0708u64;
        let bytes = [8u8, 7, 6, 5, 4, 3, 2, 1];
        assert_eq!(hash64(v, 9), xxh64(&bytes, 9));
    }

    #[test]
    fn test_mix32_zero_is_fixed_point() {
        assert_eq!(mix32(0), 0);
    }

    #[test]
    fn test_mix32_is_a_bijection_on_a_sample() {
        // Odd multipliers and rotations are invertible, so distinct inputs
        // must stay distinct.
        let outputs: HashSet<u32> = (0..10_000u32).map(mix32).collect();
        assert_eq!(outputs.len(), 10_000);
    }

    #[test]
    fn test_mix32_spreads_consecutive_inputs() {
        let a = mix32(1);
        let b = mix32(2);
        assert!((a ^ b).count_ones() > 4);
    }
}
