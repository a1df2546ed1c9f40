// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the bit table.

/// Errors that can occur when sizing a bit table.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum BitTableError {
    /// A table must hold at least one bit
    #[error("Bit table must have a non-zero size")]
    ZeroSize,

    /// The requested size does not fit in addressable memory
    #[error("Bit table of {0} bits is too large")]
    TooLarge(u64),
}

/// Result type for bit table operations
pub type Result<T> = std::result::Result<T, BitTableError>;
