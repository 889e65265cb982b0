//! MESGbmg1 message catalog reader and writer.
//!
//! A catalog holds the UTF-16 strings a layout displays, addressed by index
//! (and optionally by id).
//!
//! # File Format
//!
//! - 0x20 bytes: header (`MESGbmg1`, file size, section count, encoding)
//! - `INF1`: entry table (text offset + attribute bytes per message)
//! - `DAT1`: text pool
//! - `MID1` (optional): message ids
//!
//! Every section is padded to 32 bytes. Sections other than these three are
//! carried through unchanged.
//!
//! # Example
//!
//! ```no_run
//! use wuj_bmg::MessageCatalog;
//!
//! let catalog = MessageCatalog::parse(&std::fs::read("common.bmg")?)?;
//! for message in &catalog.messages {
//!     println!("{:?}: {}", message.id, message.text);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod catalog;
mod error;
mod header;
pub mod text;

pub use catalog::{
    ExtraSection, IdTable, Message, MessageCatalog, DAT1, DEFAULT_ENTRY_SIZE, DEFAULT_ID_FORMAT, INF1, MID1,
};
pub use error::{Error, Result};
pub use header::{MessageHeader, ENCODING_UTF16, MAGIC, SECTION_ALIGNMENT};
