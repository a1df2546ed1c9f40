//! Closed-form false-positive models.
//!
//! The standard Bloom filter formula gives the expected rate for ideal,
//! independent probes. Cache-local, two-index and 32-bit algorithms lose
//! accuracy in predictable ways, and the extra terms here approximate that
//! loss so sampled rates can be read against them.

use serde::Serialize;

use crate::hashing::round_up_to_pow2;

/// Standard Bloom filter false-positive rate for `m` bits, `n` keys and `k`
/// probes: `(1 - e^(-nk/m))^k`.
pub fn bffp(m: f64, n: f64, k: f64) -> f64 {
    (1.0 - (-n * k / m).exp()).powf(k)
}

/// Expected rate when every key lands in one `line_bits` line of an
/// `m`-bit table.
///
/// Keys per line is modelled as `n / lines`, and the rate is the mean of
/// the rates one standard deviation above and below. Returns `None` when
/// the table is smaller than one line or the line is empty.
pub fn cache_line_rate(m: u32, n: u64, k: u32, line_bits: u32) -> Option<f64> {
    let lines = m.checked_div(line_bits).unwrap_or(0);
    if lines == 0 {
        return None;
    }
    let cache_n = n as f64 / f64::from(lines);
    let spread = cache_n.sqrt();
    let c = f64::from(line_bits);
    let k = f64::from(k);
    Some((bffp(c, cache_n + spread, k) + bffp(c, cache_n - spread, k)) / 2.0)
}

/// Extra rate from two keys sharing both double-hashing indexes.
pub fn two_index_addl(m: u32, n: u64) -> f64 {
    n as f64 / f64::from(m) / f64::from(m)
}

/// Extra rate from two keys colliding in a 32-bit hash.
pub fn narrow_hash_addl(n: u64) -> f64 {
    n as f64 / 4_294_967_296.0
}

/// How large a "cache line" an algorithm effectively confines a key to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheLine {
    /// A fixed number of bits
    Fixed(u32),
    /// Two bits per word: `round_up_to_pow2(k / 2)` words
    PairedWords,
    /// Two bits per word plus a word for the odd bit
    PairedWordsRoundedUp,
    /// `k / 2` consecutive words, not aligned
    ConsecutiveWords,
}

impl CacheLine {
    /// Line size in bits for `k` probes.
    pub fn bits(self, k: u32) -> u32 {
        match self {
            CacheLine::Fixed(bits) => bits,
            CacheLine::PairedWords => round_up_to_pow2(k / 2) * 64,
            CacheLine::PairedWordsRoundedUp => round_up_to_pow2((k + 1) / 2) * 64,
            CacheLine::ConsecutiveWords => (k / 2) * 64,
        }
    }
}

/// Annotations that apply to an algorithm's report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FpProfile {
    /// Effective line a key is confined to
    pub cache_line: Option<CacheLine>,
    /// Probes come from two base indexes
    pub two_index: bool,
    /// Only 32 bits of the hash are used
    pub narrow_hash: bool,
}

impl FpProfile {
    /// No annotations.
    pub const PLAIN: Self = Self {
        cache_line: None,
        two_index: false,
        narrow_hash: false,
    };
}
