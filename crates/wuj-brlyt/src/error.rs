//! Error types for layout files.

use thiserror::Error;

/// Errors that can occur when reading or writing layouts.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] wuj_common::Error),

    /// Record or section tree error.
    #[error("{0}")]
    Schema(#[from] wuj_schema::Error),

    /// The byte-order mark is not big-endian.
    #[error("unsupported byte-order mark {0:#06x}")]
    ByteOrderMark(u16),

    /// The header size field does not match the header layout.
    #[error("invalid header size {0:#x}")]
    HeaderSize(u16),

    /// The declared file size runs past the end of the data.
    #[error("file declares {declared} bytes but only {actual} are present")]
    Truncated { declared: usize, actual: usize },

    /// The encoded file does not fit the 32-bit size field.
    #[error("layout of {0} bytes is too large")]
    TooLarge(usize),
}

/// Result type for layout operations.
pub type Result<T> = std::result::Result<T, Error>;
