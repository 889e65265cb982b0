//! Fixed headers of the message catalog format.

use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Catalog file magic.
pub const MAGIC: &[u8; 8] = b"MESGbmg1";

/// Text encoding id for UTF-16BE, the only one supported.
pub const ENCODING_UTF16: u8 = 2;

/// Sections are padded to a multiple of this many bytes.
pub const SECTION_ALIGNMENT: usize = 32;

/// File header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct MessageHeader {
    pub magic: [u8; 8],
    pub file_size: U32,
    pub section_count: U32,
    pub encoding: u8,
    pub padding: [u8; 15],
}

impl MessageHeader {
    pub const SIZE: usize = 0x20;

    pub fn new(file_size: u32, section_count: u32, encoding: u8) -> Self {
        Self {
            magic: *MAGIC,
            file_size: U32::new(file_size),
            section_count: U32::new(section_count),
            encoding,
            padding: [0; 15],
        }
    }
}

/// Body header of the `INF1` section.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct InfoHeader {
    pub count: U16,
    /// Bytes per entry: a u32 text offset followed by attribute bytes.
    pub entry_size: U16,
    pub file_id: U16,
    pub default_color: u8,
    pub padding: u8,
}

/// Body header of the `MID1` section.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct IdHeader {
    pub count: U16,
    pub format: u8,
    pub info: u8,
    pub padding: [u8; 4],
}
