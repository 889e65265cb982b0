//! bctr control file reader and writer.
//!
//! A control file binds a layout to its animations, message catalog and
//! picture sources. Unlike layouts it is a relocated format: records hold
//! 16-bit references into side data and a shared string pool.
//!
//! # File Format
//!
//! - 0x14 bytes: header (`bctr`, version, three string references, offsets of
//!   the animation header, layout header and string pool)
//! - Animation header record and its side data
//! - Layout header record and its side data
//! - String pool (null-terminated ASCII, empty string first)

mod control;
mod error;
pub mod schema;

pub use control::{Control, DEFAULT_VERSION, MAGIC};
pub use error::{Error, Result};
