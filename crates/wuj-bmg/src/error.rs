//! Error types for message catalogs.

use thiserror::Error;
use wuj_common::Tag;

/// Errors that can occur when reading or writing message catalogs.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] wuj_common::Error),

    /// Record or string pool error.
    #[error("{0}")]
    Schema(#[from] wuj_schema::Error),

    /// Only UTF-16 catalogs are supported.
    #[error("unsupported text encoding {0} (only 2, UTF-16, is supported)")]
    UnsupportedEncoding(u8),

    /// The declared file size runs past the end of the data.
    #[error("file declares {declared} bytes but only {actual} are present")]
    Truncated { declared: usize, actual: usize },

    /// A section's size is shorter than its header or runs past the file.
    #[error("section {tag} at offset {offset:#x} has invalid size {size:#x}")]
    InvalidSectionSize { tag: Tag, offset: usize, size: usize },

    /// A required section is missing.
    #[error("missing {0} section")]
    MissingSection(Tag),

    /// A section that may appear once appears again.
    #[error("duplicate {0} section")]
    DuplicateSection(Tag),

    /// The entry size is too small to hold a text offset.
    #[error("invalid message entry size {0}")]
    EntrySize(u16),

    /// Messages disagree on the length of their attribute bytes.
    #[error("message {index} has {actual} attribute bytes, expected {expected}")]
    AttributeSize {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// The id table and the message table have different lengths.
    #[error("{ids} message ids for {messages} messages")]
    IdCount { ids: usize, messages: usize },

    /// Some but not all messages carry an id.
    #[error("message {0} has no id")]
    MissingId(usize),

    /// A text offset points outside the text pool.
    #[error("message text offset {0:#x} is outside the text pool")]
    TextOffset(usize),

    /// Message text is not valid UTF-16.
    #[error("message text at {offset:#x} is not valid UTF-16")]
    InvalidText { offset: usize },

    /// An escape sequence is malformed, in binary or in text.
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),

    /// The encoded catalog does not fit its size fields.
    #[error("catalog of {0} bytes is too large")]
    TooLarge(usize),
}

/// Result type for message catalog operations.
pub type Result<T> = std::result::Result<T, Error>;
