//! Error types for wuj-common.

use thiserror::Error;

/// Common error type for wuj operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A read would run past the end of the buffer.
    #[error("unexpected end of buffer at offset {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// Bytes that should be ASCII text are not.
    #[error("non-ASCII text at offset {offset:#x}")]
    NonAscii { offset: usize },

    /// A tag was not exactly four ASCII bytes.
    #[error("invalid tag {0:?}: tags are exactly 4 ASCII characters")]
    InvalidTag(String),

    /// Missing null terminator in string.
    #[error("string at offset {offset:#x} missing null terminator")]
    MissingNullTerminator { offset: usize },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
