//! Quantities derived from the table size and probe count.

use serde::Serialize;

use crate::error::simulation::SimulationError;

/// Bits in a cache line.
pub const CACHE_LINE_BITS: u32 = 512;

/// Largest odd number `<= x`, or 0 when `x == 0`.
///
/// Multiplicative range reduction with an odd range keeps the low word
/// carrying entropy from one probe to the next.
#[inline]
pub fn odd_at_most(x: u32) -> u32 {
    if x == 0 {
        0
    } else {
        (x - 1) | 1
    }
}

/// Table geometry for a simulation with `m` bits and `k` probes.
///
/// The table itself is always padded to a whole number of cache lines, so
/// `len * 64 >= m` and `len` is a multiple of 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    /// Bits requested
    pub m: u32,
    /// Probes per key
    pub k: u32,
    /// `k / 2`, the number of two-bit words in the blocked algorithms
    pub k_2: u32,
    /// `m - 1`
    pub m_mask: u32,
    /// Table length in 64-bit words
    pub len: u32,
    /// `len - 1`
    pub len_mask: u32,
    /// Table length in 512-bit cache lines
    pub cache_len: u32,
    /// Number of 256-bit blocks covering `m`
    pub cache256_len: u32,
    /// Largest odd `<= m`
    pub m_odd: u32,
    /// Largest odd `<= len`
    pub len_odd: u32,
    /// `2 * len - 1`, the odd range over 32-bit halves
    pub len32_odd: u32,
    /// Largest odd `<= cache_len`
    pub cache_len_odd: u32,
    /// `len / k_2`, or 0 when `k < 2`
    pub len_k_2: u32,
    /// Largest odd `<= len_k_2`
    pub len_k_2_odd: u32,
    /// `log2(m)` when `m` is a power of two, else 0
    pub bits_m: u32,
    /// `log2(len)` when `m` is a power of two, else 0
    pub bits_len: u32,
    /// `64 - bits_m` when `m` is a power of two, else 0
    pub bits_64_minus_m: u32,
    /// `64 - bits_len` when `m` is a power of two, else 0
    pub bits_64_minus_len: u32,
}

impl Geometry {
    /// Derive the geometry for `m` bits and `k` probes.
    pub fn new(m: u32, k: u32) -> Result<Self, SimulationError> {
        if m == 0 {
            return Err(SimulationError::ZeroBits);
        }

        let padded = ((u64::from(m) - 1) | 511) + 1;
        let len = (padded / 64) as u32;
        let cache_len = (padded / 512) as u32;
        let cache256_len = (((u64::from(m) - 1) | 255) + 1) / 256;
        let k_2 = k / 2;
        let len_k_2 = if k_2 > 0 { len / k_2 } else { 0 };

        let (bits_m, bits_len) = if m.is_power_of_two() {
            (m.trailing_zeros(), len.trailing_zeros())
        } else {
            (0, 0)
        };
        let pow2 = m.is_power_of_two();

        Ok(Self {
            m,
            k,
            k_2,
            m_mask: m - 1,
            len,
            len_mask: len - 1,
            cache_len,
            cache256_len: cache256_len as u32,
            m_odd: odd_at_most(m),
            len_odd: odd_at_most(len),
            len32_odd: 2 * len - 1,
            cache_len_odd: odd_at_most(cache_len),
            len_k_2,
            len_k_2_odd: odd_at_most(len_k_2),
            bits_m,
            bits_len,
            bits_64_minus_m: if pow2 { 64 - bits_m } else { 0 },
            bits_64_minus_len: if pow2 { 64 - bits_len } else { 0 },
        })
    }

    /// True if `m` is a power of two.
    pub fn is_pow2(&self) -> bool {
        self.m.is_power_of_two()
    }

    /// Table size in bits after padding.
    pub fn table_bits(&self) -> u64 {
        u64::from(self.len) * 64
    }
}
