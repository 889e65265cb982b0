//! Schema-driven codecs for big-endian binary formats.
//!
//! Formats are described as static tables of [`Field`]s and decoded into
//! insertion-ordered [`Record`]s:
//!
//! - [`Primitive`] - Fixed-width scalars (integers, booleans, floats, tags, fixed strings)
//! - [`inline`] - Contiguous mode: arrays stored at a fixed distance from their record
//! - [`PooledDecoder`] / [`PooledEncoder`] - Relocated mode: string and array references
//!   into a side region and a shared [`StringTable`]
//! - [`SectionTable`] - Tagged chunk streams reconstructed into a tree of [`Section`]s
//!
//! # Example
//!
//! ```
//! use wuj_schema::{inline, Field, InlineKind, Record, Value};
//!
//! const POINT: &[Field<InlineKind>] = &[
//!     Field::new("x", InlineKind::U16),
//!     Field::new("y", InlineKind::U16),
//! ];
//!
//! let (record, end) = inline::decode_record(POINT, &[0, 1, 0, 2], 0).unwrap();
//! assert_eq!(end, 4);
//! assert_eq!(record.get("y"), Some(&Value::Int(2)));
//! assert_eq!(inline::encode_record(POINT, &record).unwrap(), [0, 1, 0, 2]);
//! ```

mod error;
mod field;
pub mod inline;
mod pooled;
mod primitive;
mod section;
mod string_table;
mod value;

pub use error::{Error, Result};
pub use field::{
    field_offset, record_size, Field, FieldKind, InlineKind, PooledKind, INLINE_ARRAY_HEADER,
    POOLED_ARRAY_HEADER, POOLED_STRING_SIZE,
};
pub use pooled::{PooledDecoder, PooledEncoder};
pub use primitive::{round_float, Primitive, FLOAT_DIGITS};
pub use section::{ScopeRule, Section, SectionTable, CHILDREN_KEY, DATA_KEY, MAX_DEPTH, SIZE_KEY, TAG_KEY};
pub use string_table::StringTable;
pub use value::{Record, Value, INFINITY_TEXT, NAN_TEXT, NEG_INFINITY_TEXT};

pub use wuj_common::Tag;
