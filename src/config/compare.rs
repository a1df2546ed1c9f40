//! Comparison configuration module.

use serde::{Deserialize, Serialize};

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use crate::simulation::Algorithm;

/// Upper bound on comparison worker threads.
const MAX_WORKERS: usize = 1024;

/// Comparison configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompareConfig {
    /// Algorithms to compare; empty means all of them
    pub algorithms: Vec<Algorithm>,

    /// Worker threads; 0 means one per CPU
    pub workers: usize,
}

impl Validate for CompareConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.workers > MAX_WORKERS {
            return Err(ConfigError::ValueOutOfRange {
                key: "compare.workers".to_string(),
                message: format!("must be at most {MAX_WORKERS}, got {}", self.workers),
            });
        }

        for (i, algorithm) in self.algorithms.iter().enumerate() {
            if self.algorithms[..i].contains(algorithm) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate algorithm in compare.algorithms: {algorithm}"
                )));
            }
        }

        Ok(())
    }
}
