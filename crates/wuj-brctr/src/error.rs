//! Error types for control files.

use thiserror::Error;

/// Errors that can occur when reading or writing control files.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] wuj_common::Error),

    /// Record or string pool error.
    #[error("{0}")]
    Schema(#[from] wuj_schema::Error),

    /// A header offset points outside the file.
    #[error("{name} offset {offset:#x} is past the end of the file ({len:#x} bytes)")]
    OffsetOutOfBounds {
        name: &'static str,
        offset: usize,
        len: usize,
    },
}

/// Result type for control file operations.
pub type Result<T> = std::result::Result<T, Error>;
