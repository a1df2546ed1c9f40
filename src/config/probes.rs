//! Probe configuration module.
//!
//! Settings for the entropy probe and the multiplicative cycle scan.

use serde::{Deserialize, Serialize};

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use crate::probes::{EntropyParams, WordWidth};

/// Entropy probe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropyConfig {
    /// PRNG seed
    pub seed: u64,

    /// Number of tests to run; unset runs until interrupted
    pub tests: Option<u64>,

    /// Values per "various" test
    pub various_iterations: u32,

    /// Values per "same" test
    pub same_iterations: u32,

    /// Log2 of the range each chain must cover
    pub range_bits: u32,

    /// Snap multipliers down to the nearest prime
    pub prime_multipliers: bool,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        let params = EntropyParams::default();
        Self {
            seed: params.seed,
            tests: params.tests,
            various_iterations: params.various_iterations,
            same_iterations: params.same_iterations,
            range_bits: params.range_bits,
            prime_multipliers: params.prime_multipliers,
        }
    }
}

impl EntropyConfig {
    /// The probe parameters described by this section.
    pub fn params(&self) -> EntropyParams {
        EntropyParams {
            seed: self.seed,
            tests: self.tests,
            various_iterations: self.various_iterations,
            same_iterations: self.same_iterations,
            range_bits: self.range_bits,
            prime_multipliers: self.prime_multipliers,
        }
    }
}

impl Validate for EntropyConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.params()
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("entropy: {e}")))
    }
}

/// Cycle scan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclesConfig {
    /// Word width to scan
    pub width: WordWidth,

    /// First multiplier; defaults to 1
    pub start: Option<u64>,

    /// Exclusive end of the scan; defaults to the end of the word
    pub limit: Option<u64>,
}

impl Default for CyclesConfig {
    fn default() -> Self {
        Self {
            width: WordWidth::W32,
            start: None,
            limit: None,
        }
    }
}

impl Validate for CyclesConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let (Some(start), Some(limit)) = (self.start, self.limit) {
            if start >= limit {
                return Err(ConfigError::ValueOutOfRange {
                    key: "cycles.limit".to_string(),
                    message: format!("must be greater than cycles.start ({start}), got {limit}"),
                });
            }
        }
        Ok(())
    }
}
