//! Four-character identifiers and chunk framing.

use std::fmt;
use std::str::FromStr;

use zerocopy::byteorder::big_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{Error, Result};

/// A four-byte ASCII identifier, such as a chunk tag (`pan1`) or file magic
/// (`bctr`).
///
/// Tags are compared byte-for-byte and are never null-trimmed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Create a tag from a literal. Panics (at compile time in const contexts)
    /// if the bytes are not ASCII.
    pub const fn new(bytes: &[u8; 4]) -> Self {
        let mut i = 0;
        while i < 4 {
            assert!(bytes[i].is_ascii(), "tag bytes must be ASCII");
            i += 1;
        }
        Self(*bytes)
    }

    /// Create a tag from a slice that must be exactly four ASCII bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match <[u8; 4]>::try_from(bytes) {
            Ok(raw) if raw.is_ascii() => Ok(Self(raw)),
            _ => Err(Error::InvalidTag(String::from_utf8_lossy(bytes).into_owned())),
        }
    }

    /// The raw bytes of the tag.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The tag as text.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII.
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", self.as_str())
    }
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

/// Header of a self-sized chunk in a tagged section stream.
///
/// `size` is the total chunk length in bytes, including this 8-byte header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ChunkHeader {
    /// Chunk tag.
    pub tag: [u8; 4],
    /// Total chunk size, header included.
    pub size: U32,
}

impl ChunkHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 8;

    /// Create a header for a chunk of `size` total bytes.
    pub fn new(tag: Tag, size: u32) -> Self {
        Self {
            tag: *tag.as_bytes(),
            size: U32::new(size),
        }
    }

    /// The chunk tag, validated as ASCII.
    pub fn tag(&self) -> Result<Tag> {
        Tag::from_slice(&self.tag)
    }

    /// The total chunk size.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size.get()
    }
}
