//! Field descriptors and the two addressing-mode kind sets.
//!
//! A schema is a `&'static [Field<K>]`. The kind type `K` fixes the addressing
//! mode: [`InlineKind`] for formats that store arrays inline in the record
//! layout, [`PooledKind`] for formats that store strings and array payloads
//! in a separately addressed region. A schema cannot mix the two.

use crate::Primitive;

/// Width of a contiguous array header (the element count).
pub const INLINE_ARRAY_HEADER: usize = 2;

/// Width of a relocated array header (offset + count).
pub const POOLED_ARRAY_HEADER: usize = 4;

/// Width of a relocated string reference.
pub const POOLED_STRING_SIZE: usize = 2;

/// Anything that occupies a fixed number of bytes inside a record.
pub trait FieldKind: 'static {
    /// Bytes the field occupies in its record (array headers only, not payloads).
    fn size(&self) -> usize;
}

/// A named, typed field. A `None` name marks padding.
#[derive(Debug, Clone, Copy)]
pub struct Field<K: 'static> {
    /// Key of the decoded value.
    pub name: Option<&'static str>,
    /// Field kind.
    pub kind: K,
}

impl<K: 'static> Field<K> {
    /// A named field.
    pub const fn new(name: &'static str, kind: K) -> Self {
        Self {
            name: Some(name),
            kind,
        }
    }

    /// An unnamed field; decoded as absent and encoded as zeros.
    pub const fn padding(kind: K) -> Self {
        Self { name: None, kind }
    }

    /// Name used in error messages.
    pub fn label(&self) -> &'static str {
        self.name.unwrap_or("<padding>")
    }
}

impl<K: FieldKind> Field<K> {
    /// Bytes the field occupies in its record.
    pub fn size(&self) -> usize {
        self.kind.size()
    }
}

/// Total fixed size of a record.
pub fn record_size<K: FieldKind>(fields: &[Field<K>]) -> usize {
    fields.iter().map(Field::size).sum()
}

/// Offset of the named field from the start of its record.
pub fn field_offset<K: FieldKind>(fields: &[Field<K>], name: &str) -> Option<usize> {
    let mut offset = 0;
    for field in fields {
        if field.name == Some(name) {
            return Some(offset);
        }
        offset += field.size();
    }
    None
}

/// Field kinds for the contiguous addressing mode.
#[derive(Debug, Clone, Copy)]
pub enum InlineKind {
    /// A fixed-width scalar.
    Primitive(Primitive),
    /// A 16-bit element count stored at the field; the elements follow at
    /// `start_offset` bytes from the start of the record.
    Array {
        start_offset: usize,
        fields: &'static [Field<InlineKind>],
    },
}

impl InlineKind {
    pub const U8: Self = Self::Primitive(Primitive::U8);
    pub const U16: Self = Self::Primitive(Primitive::U16);
    pub const U32: Self = Self::Primitive(Primitive::U32);
    pub const BOOL8: Self = Self::Primitive(Primitive::Bool8);
    pub const BOOL16: Self = Self::Primitive(Primitive::Bool16);
    pub const F32: Self = Self::Primitive(Primitive::F32);
    pub const TAG: Self = Self::Primitive(Primitive::Tag);

    pub const fn pad(size: usize) -> Self {
        Self::Primitive(Primitive::Pad(size))
    }

    pub const fn string(size: usize) -> Self {
        Self::Primitive(Primitive::FixedString(size))
    }

    pub const fn array(start_offset: usize, fields: &'static [Field<InlineKind>]) -> Self {
        Self::Array {
            start_offset,
            fields,
        }
    }
}

impl FieldKind for InlineKind {
    fn size(&self) -> usize {
        match self {
            Self::Primitive(p) => p.size(),
            Self::Array { .. } => INLINE_ARRAY_HEADER,
        }
    }
}

/// Field kinds for the relocated addressing mode.
#[derive(Debug, Clone, Copy)]
pub enum PooledKind {
    /// A fixed-width scalar.
    Primitive(Primitive),
    /// A 16-bit offset into the string pool.
    String,
    /// A 16-bit offset (relative to the owning record) and a 16-bit count.
    Array { fields: &'static [Field<PooledKind>] },
}

impl PooledKind {
    pub const U8: Self = Self::Primitive(Primitive::U8);
    pub const U16: Self = Self::Primitive(Primitive::U16);
    pub const U32: Self = Self::Primitive(Primitive::U32);
    pub const BOOL8: Self = Self::Primitive(Primitive::Bool8);
    pub const BOOL16: Self = Self::Primitive(Primitive::Bool16);
    pub const F32: Self = Self::Primitive(Primitive::F32);
    pub const TAG: Self = Self::Primitive(Primitive::Tag);

    pub const fn pad(size: usize) -> Self {
        Self::Primitive(Primitive::Pad(size))
    }

    pub const fn array(fields: &'static [Field<PooledKind>]) -> Self {
        Self::Array { fields }
    }
}

impl FieldKind for PooledKind {
    fn size(&self) -> usize {
        match self {
            Self::Primitive(p) => p.size(),
            Self::String => POOLED_STRING_SIZE,
            Self::Array { .. } => POOLED_ARRAY_HEADER,
        }
    }
}
