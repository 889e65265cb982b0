//! RLYT file header.

use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Layout file magic.
pub const MAGIC: &[u8; 4] = b"RLYT";

/// Big-endian byte-order mark.
pub const BYTE_ORDER_MARK: u16 = 0xFEFF;

/// Version written when a textual layout does not name one.
pub const DEFAULT_VERSION: u16 = 0x000A;

/// Fixed header at the start of every layout file.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct LayoutHeader {
    /// `RLYT`.
    pub magic: [u8; 4],
    /// Byte-order mark, `0xFEFF`.
    pub bom: U16,
    /// Format version.
    pub version: U16,
    /// Total file size.
    pub file_size: U32,
    /// Size of this header.
    pub header_size: U16,
    /// Number of chunks, scope markers included.
    pub section_count: U16,
}

impl LayoutHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 0x10;

    /// Create a header for a file of `file_size` bytes holding `section_count` chunks.
    pub fn new(version: u16, file_size: u32, section_count: u16) -> Self {
        Self {
            magic: *MAGIC,
            bom: U16::new(BYTE_ORDER_MARK),
            version: U16::new(version),
            file_size: U32::new(file_size),
            header_size: U16::new(Self::SIZE as u16),
            section_count: U16::new(section_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        assert_eq!(std::mem::size_of::<LayoutHeader>(), LayoutHeader::SIZE);

        let header = LayoutHeader::new(10, 0x1234, 7);
        assert_eq!(
            header.as_bytes(),
            b"RLYT\xFE\xFF\x00\x0A\x00\x00\x12\x34\x00\x10\x00\x07"
        );
    }
}
