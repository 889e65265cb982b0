//! Common utilities for wuj.
//!
//! This crate provides the foundational types shared by every format crate:
//!
//! - [`BinaryReader`] - Bounds-checked big-endian reading from byte slices
//! - [`Tag`] - Four-character chunk and file identifiers
//! - [`ChunkHeader`] - The `tag + size` framing used by tagged section streams

mod error;
mod reader;
mod tag;

pub use error::{Error, Result};
pub use reader::{ascii_str, BinaryReader};
pub use tag::{ChunkHeader, Tag};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Re-export the big-endian integer wrappers used by on-disk headers
pub use zerocopy::byteorder::big_endian;

/// Re-export memchr for terminator scans
pub use memchr;
