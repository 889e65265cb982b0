//! Error types for schema-driven decoding and encoding.

use thiserror::Error;
use wuj_common::Tag;

/// Errors that can occur while decoding or encoding records and sections.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error (bounds, magic, ASCII).
    #[error("{0}")]
    Common(#[from] wuj_common::Error),

    /// A value has the wrong type for the field it is encoded into.
    #[error("field {field:?}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// An integer does not fit the width of its field.
    #[error("field {field:?}: value {value} exceeds maximum {max}")]
    IntegerOutOfRange { field: String, value: u64, max: u64 },

    /// A string is longer than its fixed-width field.
    #[error("field {field:?}: string of {len} bytes does not fit in {max} bytes")]
    StringTooLong {
        field: String,
        len: usize,
        max: usize,
    },

    /// A string cannot be stored as ASCII text.
    #[error("field {field:?}: {value:?} is not representable as ASCII")]
    InvalidString { field: String, value: String },

    /// An array holds more elements than its count field can express.
    #[error("field {field:?}: {count} elements do not fit a 16-bit count")]
    CountOverflow { field: String, count: usize },

    /// A relocated offset does not fit its 16-bit reference field.
    #[error("offset {offset:#x} does not fit a 16-bit reference")]
    OffsetOverflow { offset: usize },

    /// A contiguous array payload would overwrite bytes already written.
    #[error("field {field:?}: payload at {start_offset:#x} overlaps {written:#x} bytes already written")]
    ArrayOverlap {
        field: String,
        start_offset: usize,
        written: usize,
    },

    /// An encoded array element is not exactly one stride long.
    #[error("field {field:?}: element encoded to {actual} bytes, expected {expected}")]
    ElementSize {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A field the format requires is missing.
    #[error("missing required field {0:?}")]
    MissingField(String),

    /// A raw byte field is not valid hex.
    #[error("field {field:?}: invalid hex data: {source}")]
    InvalidHex {
        field: String,
        #[source]
        source: hex::FromHexError,
    },

    /// A scope-open chunk does not follow its owner.
    #[error("unexpected {tag} after {} at offset {offset:#x} (expected {expected})", or_none(.previous))]
    UnexpectedScopeOpen {
        tag: Tag,
        previous: Option<Tag>,
        expected: Tag,
        offset: usize,
    },

    /// A scope-close chunk does not end its owner's scope.
    #[error("unexpected {tag} inside {} at offset {offset:#x} (expected {expected})", or_none(.parent))]
    UnexpectedScopeClose {
        tag: Tag,
        parent: Option<Tag>,
        expected: Tag,
        offset: usize,
    },

    /// The stream ended inside a child scope.
    #[error("child scope of {owner} is never closed")]
    UnterminatedScope { owner: Tag },

    /// A chunk's declared size is shorter than its header or record, or runs past the stream.
    #[error("chunk {tag} at offset {offset:#x} has invalid size {size:#x}")]
    InvalidChunkSize { tag: Tag, offset: usize, size: usize },

    /// Child scopes are nested deeper than the supported limit.
    #[error("child scope of {owner} at offset {offset:#x} is nested deeper than {limit} levels")]
    NestingTooDeep { owner: Tag, offset: usize, limit: usize },

    /// No schema is registered for a chunk tag.
    #[error("unknown section {tag} at offset {offset:#x}")]
    UnknownSection { tag: Tag, offset: usize },

    /// A section cannot own children, or a scope marker appears as a node.
    #[error("section {0} cannot appear here")]
    MisplacedSection(Tag),
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, Error>;

fn or_none(tag: &Option<Tag>) -> String {
    tag.map_or_else(|| "None".to_string(), |t| t.to_string())
}
