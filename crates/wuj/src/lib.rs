//! wuj - codecs for packaged UI runtime assets.
//!
//! This crate provides a unified interface to the wuj library ecosystem and
//! converts every supported binary format to and from an ordered textual
//! [`Record`](wuj_schema::Record).
//!
//! # Crates
//!
//! - [`wuj_common`] - Common utilities (binary reading, tags, chunk headers)
//! - [`wuj_schema`] - Schema engine, string pools and section trees
//! - [`wuj_brlyt`] - Layouts (`.brlyt`)
//! - [`wuj_brctr`] - Control files (`.brctr`)
//! - [`wuj_bmg`] - Message catalogs (`.bmg`)
//!
//! # Example
//!
//! ```no_run
//! use wuj::prelude::*;
//!
//! let data = std::fs::read("menu.brctr")?;
//! let format = Format::detect(&data).ok_or("unknown format")?;
//! let record = format.decode(&data)?;
//! assert_eq!(format.encode(&record)?, data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod format;

pub use error::{Error, Result};
pub use format::Format;

// Re-export all sub-crates
pub use wuj_bmg as bmg;
pub use wuj_brctr as brctr;
pub use wuj_brlyt as brlyt;
pub use wuj_common as common;
pub use wuj_schema as schema;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::Format;
    pub use wuj_bmg::{Message, MessageCatalog};
    pub use wuj_brctr::Control;
    pub use wuj_brlyt::Layout;
    pub use wuj_common::{BinaryReader, Tag};
    pub use wuj_schema::{Record, Section, StringTable, Value};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
