//! Simulation error module.
//!
//! Parameter and geometry errors detected before a simulation starts.

use thiserror::Error;

use crate::data_structures::BitTableError;

/// Errors that can occur while setting up a simulation.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum SimulationError {
    /// The table must have at least one bit.
    #[error("Number of bits must be non-zero")]
    ZeroBits,

    /// Neither k nor bits per key was given.
    #[error("Must specify non-zero for either k or bits per key")]
    MissingProbeCount,

    /// Bits per key must be a finite positive number (or zero to derive it).
    #[error("Invalid bits per key: {0}")]
    InvalidBitsPerKey(String),

    /// The derived number of keys per structure is zero.
    #[error("Parameters yield zero keys per structure (m={bits}, k={k})")]
    NoKeys {
        /// Table size in bits
        bits: u32,
        /// Probes per key
        k: u32,
    },

    /// The algorithm only works with power-of-two table sizes.
    #[error("{algorithm} requires a power-of-two number of bits of at least {min}, got {bits}")]
    RequiresPowerOfTwo {
        /// Algorithm name
        algorithm: &'static str,
        /// Requested table size in bits
        bits: u32,
        /// Smallest accepted size
        min: u32,
    },

    /// The algorithm supports fewer probes than requested.
    #[error("{algorithm} supports at most k={max}, got k={k}")]
    TooManyProbes {
        /// Algorithm name
        algorithm: &'static str,
        /// Requested probes
        k: u32,
        /// Largest accepted k
        max: u32,
    },

    /// The algorithm needs more probes than requested.
    #[error("{algorithm} requires at least k={min}, got k={k}")]
    TooFewProbes {
        /// Algorithm name
        algorithm: &'static str,
        /// Requested probes
        k: u32,
        /// Smallest accepted k
        min: u32,
    },

    /// The algorithm is specialized for exactly one k.
    #[error("{algorithm} requires exactly k={required}, got k={k}")]
    WrongProbeCount {
        /// Algorithm name
        algorithm: &'static str,
        /// Requested probes
        k: u32,
        /// The only accepted k
        required: u32,
    },

    /// No algorithm has the given name.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The bit table could not be allocated.
    #[error("Bit table error: {0}")]
    Table(#[from] BitTableError),
}

impl SimulationError {
    /// Whether the error comes from an algorithm rejecting otherwise valid
    /// parameters.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::RequiresPowerOfTwo { .. }
                | Self::TooManyProbes { .. }
                | Self::TooFewProbes { .. }
                | Self::WrongProbeCount { .. }
        )
    }
}
