//! Probe error module.

use thiserror::Error;

use crate::data_structures::BitTableError;

/// Errors that can occur while running the entropy or cycle probes.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Range bits outside `1..=32`.
    #[error("Range bits must be between 1 and 32, got {0}")]
    InvalidRangeBits(u32),

    /// An iteration count of zero.
    #[error("{0} must be greater than 0")]
    ZeroIterations(&'static str),

    /// The scan range is empty.
    #[error("Empty scan range: start {start:#x} is not below end {end:#x}")]
    EmptyRange {
        /// First value to scan
        start: u64,
        /// Exclusive end of the scan
        end: u64,
    },

    /// The collision bit set could not be allocated.
    #[error("Bit table error: {0}")]
    Table(#[from] BitTableError),

    /// Writing probe output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
