//! RLYT layout reader and writer.
//!
//! Layout files describe a screen as a flat stream of tagged chunks. Pane
//! hierarchy and group membership are implied by `pas1`/`pae1` and
//! `grs1`/`gre1` scope markers; [`Layout::parse`] turns the stream back into a
//! tree and [`Layout::to_bytes`] flattens it again.
//!
//! # File Format
//!
//! - 0x10 bytes: header (`RLYT`, byte-order mark, version, file size, header
//!   size, chunk count)
//! - Chunks: 4-byte tag, u32 total size, body
//!
//! Chunk bytes that no schema describes are kept as raw trailing data, so a
//! parsed layout re-encodes to the same bytes.
//!
//! # Example
//!
//! ```no_run
//! use wuj_brlyt::Layout;
//!
//! let data = std::fs::read("menu.brlyt")?;
//! let layout = Layout::parse(&data)?;
//! for section in &layout.sections {
//!     println!("{} ({} children)", section.tag, section.children().len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod layout;
pub mod schema;

pub use error::{Error, Result};
pub use header::{LayoutHeader, BYTE_ORDER_MARK, DEFAULT_VERSION, MAGIC};
pub use layout::{Layout, SECTIONS_KEY, VERSION_KEY};
pub use schema::LAYOUT_SECTIONS;
