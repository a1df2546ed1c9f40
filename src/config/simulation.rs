//! Simulation configuration module.
//!
//! Parameters for a single `simulate` run. The same values seed a
//! `compare` run, which only swaps the algorithm.

use serde::{Deserialize, Serialize};

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use crate::simulation::{Algorithm, SimulationParams};

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Bit-selection algorithm
    pub algorithm: Algorithm,

    /// Table size in bits (m)
    pub bits: u32,

    /// Probes per key (k); 0 derives it from `bits_per_key`
    pub k: u32,

    /// Bits per key; 0 derives the key count from `k`
    pub bits_per_key: f64,

    /// PRNG seed
    pub seed: u64,

    /// Total number of queries
    pub queries: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let params = SimulationParams::default();
        Self {
            algorithm: Algorithm::CacheWorm64,
            bits: params.bits,
            k: params.k,
            bits_per_key: params.bits_per_key,
            seed: params.seed,
            queries: params.queries,
        }
    }
}

impl SimulationConfig {
    /// The runner parameters described by this section.
    pub fn params(&self) -> SimulationParams {
        SimulationParams::new(self.bits)
            .with_k(self.k)
            .with_bits_per_key(self.bits_per_key)
            .with_seed(self.seed)
            .with_queries(self.queries)
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.bits == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.bits must be greater than 0".to_string(),
            ));
        }

        if !self.bits_per_key.is_finite() || self.bits_per_key < 0.0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "simulation.bits_per_key".to_string(),
                message: format!("must be a finite value >= 0, got {}", self.bits_per_key),
            });
        }

        if self.k == 0 && self.bits_per_key == 0.0 {
            return Err(ConfigError::ValidationError(
                "Must specify non-zero for either simulation.k or simulation.bits_per_key"
                    .to_string(),
            ));
        }

        if self.queries == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.queries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
