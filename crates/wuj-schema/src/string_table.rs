//! Deduplicating string pool.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::primitive::check_ascii;
use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// A pool of terminated strings addressed by byte offset.
///
/// The empty string is pre-seeded at offset 0. Equal strings share one entry,
/// and offsets are handed out in first-insertion order. The pool only grows,
/// so an offset stays valid for the rest of the encode pass.
#[derive(Debug, Clone)]
pub struct StringTable {
    buffer: Vec<u8>,
    offsets: FxHashMap<Vec<u8>, usize>,
    terminator: &'static [u8],
}

impl StringTable {
    /// A pool of null-terminated ASCII strings.
    pub fn ascii() -> Self {
        Self::with_terminator(&[0])
    }

    /// A pool of UTF-16 strings terminated by a zero code unit.
    pub fn utf16() -> Self {
        Self::with_terminator(&[0, 0])
    }

    fn with_terminator(terminator: &'static [u8]) -> Self {
        let mut offsets = FxHashMap::default();
        offsets.insert(Vec::new(), 0);
        Self {
            buffer: terminator.to_vec(),
            offsets,
            terminator,
        }
    }

    /// Add already-encoded string bytes (without terminator) and return
    /// their offset.
    pub fn insert_bytes(&mut self, bytes: &[u8]) -> usize {
        if let Some(&offset) = self.offsets.get(bytes) {
            return offset;
        }

        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        self.buffer.extend_from_slice(self.terminator);
        self.offsets.insert(bytes.to_vec(), offset);
        offset
    }

    /// Add an ASCII string and return its 16-bit offset.
    pub fn intern(&mut self, s: &str) -> Result<u16> {
        check_ascii("<string>", s)?;
        let offset = self.insert_bytes(s.as_bytes());
        u16::try_from(offset).map_err(|_| Error::OffsetOverflow { offset })
    }

    /// Offset of a previously interned ASCII string.
    pub fn offset_of(&self, s: &str) -> Option<usize> {
        self.offsets.get(s.as_bytes()).copied()
    }

    /// Size of the pool in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if only the empty string is present.
    pub fn is_empty(&self) -> bool {
        self.offsets.len() == 1
    }

    /// The pool bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the table and return the pool bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
