//! Relocated addressing mode.
//!
//! Records hold only fixed-width references: strings are 16-bit offsets into
//! a shared string pool, arrays are a 16-bit offset (relative to the record
//! that owns the field) plus a 16-bit count. The referenced data lives in a
//! side region that directly follows the outermost record.

use wuj_common::BinaryReader;

use crate::field::{record_size, Field, PooledKind};
use crate::inline::list;
use crate::primitive::string;
use crate::{Error, Record, Result, StringTable, Value};

/// Decodes relocated records from a file whose string pool starts at a known
/// offset.
#[derive(Debug, Clone, Copy)]
pub struct PooledDecoder<'a> {
    data: &'a [u8],
    pool_base: usize,
}

impl<'a> PooledDecoder<'a> {
    /// Create a decoder over `data` with the string pool at `pool_base`.
    pub fn new(data: &'a [u8], pool_base: usize) -> Self {
        Self { data, pool_base }
    }

    /// Read the string referenced by the 16-bit offset at `field_offset`.
    pub fn read_string(&self, field_offset: usize) -> Result<String> {
        let offset = BinaryReader::new_at(self.data, field_offset).read_u16()? as usize;
        let mut reader = BinaryReader::new_at(self.data, self.pool_base + offset);
        Ok(reader.read_cstring()?.to_string())
    }

    /// Decode a record starting at `record_offset`.
    pub fn decode_record(&self, fields: &[Field<PooledKind>], record_offset: usize) -> Result<Record> {
        let mut record = Record::with_capacity(fields.len());
        let mut cursor = record_offset;

        for field in fields {
            let value = match (field.name, field.kind) {
                (None, _) => None,
                (Some(_), PooledKind::Primitive(p)) => p.decode(self.data, cursor)?,
                (Some(_), PooledKind::String) => Some(Value::String(self.read_string(cursor)?)),
                (Some(_), PooledKind::Array { fields: nested }) => {
                    Some(Value::List(self.decode_array(nested, record_offset, cursor)?))
                }
            };

            if let (Some(name), Some(value)) = (field.name, value) {
                record.insert(name, value);
            }
            cursor += field.size();
        }

        Ok(record)
    }

    fn decode_array(
        &self,
        fields: &[Field<PooledKind>],
        record_offset: usize,
        header_offset: usize,
    ) -> Result<Vec<Record>> {
        let mut reader = BinaryReader::new_at(self.data, header_offset);
        let offset = reader.read_u16()? as usize;
        let count = reader.read_u16()? as usize;
        let stride = record_size(fields);
        let base = record_offset + offset;

        (0..count)
            .map(|i| self.decode_record(fields, base + i * stride))
            .collect()
    }
}

/// Encodes relocated records, interning every string into one pool.
///
/// One encoder is used for a whole file so that strings from all of its
/// records share a single deduplicated pool.
#[derive(Debug, Clone)]
pub struct PooledEncoder {
    strings: StringTable,
}

impl Default for PooledEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PooledEncoder {
    /// Create an encoder with an empty pool.
    pub fn new() -> Self {
        Self {
            strings: StringTable::ascii(),
        }
    }

    /// Intern a string into the pool.
    pub fn intern(&mut self, s: &str) -> Result<u16> {
        self.strings.intern(s)
    }

    /// Consume the encoder and return the pool bytes.
    pub fn into_string_pool(self) -> Vec<u8> {
        self.strings.into_bytes()
    }

    /// Encode a record followed by its side region.
    ///
    /// Array offsets are relative to the record that owns the array, which for
    /// nested elements is the element itself.
    pub fn encode_record(&mut self, fields: &[Field<PooledKind>], record: &Record) -> Result<Vec<u8>> {
        let fixed = record_size(fields);
        let mut side = Vec::new();
        let mut out = Vec::with_capacity(fixed);

        self.encode_fixed(fields, record, 0, fixed, &mut out, &mut side)?;

        out.extend_from_slice(&side);
        Ok(out)
    }

    /// Encode the fixed part of a record located at `record_pos`; payloads
    /// go to `side`, which starts at `side_base`. Positions are relative to
    /// the outermost record.
    fn encode_fixed(
        &mut self,
        fields: &[Field<PooledKind>],
        record: &Record,
        record_pos: usize,
        side_base: usize,
        out: &mut Vec<u8>,
        side: &mut Vec<u8>,
    ) -> Result<()> {
        for field in fields {
            let label = field.label();
            let value = field.name.and_then(|name| record.get(name));

            match field.kind {
                _ if field.name.is_none() => out.resize(out.len() + field.size(), 0),
                PooledKind::Primitive(p) => p.encode(label, value, out)?,
                PooledKind::String => {
                    let offset = self.intern(string(label, value)?)?;
                    out.extend_from_slice(&offset.to_be_bytes());
                }
                PooledKind::Array { fields: nested } => {
                    let items = list(label, value)?;
                    let count = u16::try_from(items.len()).map_err(|_| Error::CountOverflow {
                        field: label.to_string(),
                        count: items.len(),
                    })?;

                    let stride = record_size(nested);
                    let start = side.len();
                    // Reserve every slot first so nested payloads land after the block.
                    side.resize(start + stride * items.len(), 0);

                    for (i, item) in items.iter().enumerate() {
                        let slot = start + i * stride;
                        let mut element = Vec::with_capacity(stride);
                        self.encode_fixed(nested, item, side_base + slot, side_base, &mut element, side)?;
                        side[slot..slot + stride].copy_from_slice(&element);
                    }

                    let relative = side_base + start - record_pos;
                    let offset = u16::try_from(relative)
                        .map_err(|_| Error::OffsetOverflow { offset: relative })?;
                    out.extend_from_slice(&offset.to_be_bytes());
                    out.extend_from_slice(&count.to_be_bytes());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &[Field<PooledKind>] = &[
        Field::new("name", PooledKind::String),
        Field::new("count", PooledKind::U16),
    ];

    const HEADER: &[Field<PooledKind>] = &[
        Field::new("title", PooledKind::String),
        Field::new("entries", PooledKind::array(ENTRY)),
        Field::padding(PooledKind::pad(2)),
    ];

    const CHILD: &[Field<PooledKind>] = &[Field::new("v", PooledKind::U8), Field::padding(PooledKind::pad(1))];

    const PARENT_ITEM: &[Field<PooledKind>] = &[
        Field::new("label", PooledKind::String),
        Field::new("children", PooledKind::array(CHILD)),
    ];

    const NESTED: &[Field<PooledKind>] = &[Field::new("items", PooledKind::array(PARENT_ITEM))];

    fn sample() -> Record {
        Record::new().with("title", "menu").with(
            "entries",
            vec![
                Record::new().with("name", "start").with("count", 2u64),
                Record::new().with("name", "menu").with("count", 3u64),
            ],
        )
    }

    #[test]
    fn test_encode_layout() {
        let mut encoder = PooledEncoder::new();
        let bytes = encoder.encode_record(HEADER, &sample()).unwrap();

        #[rustfmt::skip]
        let expected = [
            0x00, 0x01,             // title -> "menu"
            0x00, 0x08, 0x00, 0x02, // entries at +8, 2 elements
            0x00, 0x00,             // padding
            0x00, 0x06, 0x00, 0x02, // "start", 2
            0x00, 0x01, 0x00, 0x03, // "menu" (deduplicated), 3
        ];
        assert_eq!(bytes, expected);
        assert_eq!(encoder.into_string_pool(), b"\0menu\0start\0");
    }

    #[test]
    fn test_roundtrip_through_file() {
        let mut encoder = PooledEncoder::new();
        let mut file = encoder.encode_record(HEADER, &sample()).unwrap();
        let pool_base = file.len();
        file.extend(encoder.into_string_pool());

        let decoder = PooledDecoder::new(&file, pool_base);
        assert_eq!(decoder.decode_record(HEADER, 0).unwrap(), sample());
    }

    #[test]
    fn test_empty_array_has_no_payload() {
        let record = Record::new().with("entries", Vec::<Record>::new());
        let mut encoder = PooledEncoder::new();
        let bytes = encoder.encode_record(HEADER, &record).unwrap();

        assert_eq!(bytes, [0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00]);

        let mut file = bytes;
        let pool_base = file.len();
        file.extend(encoder.into_string_pool());
        let decoded = PooledDecoder::new(&file, pool_base).decode_record(HEADER, 0).unwrap();
        assert_eq!(decoded.get("entries"), Some(&Value::List(Vec::new())));
        assert_eq!(decoded.get("title"), Some(&Value::from("")));
    }

    #[test]
    fn test_nested_arrays_follow_reserved_block() {
        let record = Record::new().with(
            "items",
            vec![
                Record::new()
                    .with("label", "a")
                    .with("children", vec![Record::new().with("v", 1u64), Record::new().with("v", 2u64)]),
                Record::new()
                    .with("label", "b")
                    .with("children", vec![Record::new().with("v", 3u64)]),
            ],
        );

        let mut encoder = PooledEncoder::new();
        let mut file = encoder.encode_record(NESTED, &record).unwrap();

        #[rustfmt::skip]
        let expected = [
            0x00, 0x04, 0x00, 0x02,             // items at +4, 2 elements
            0x00, 0x01, 0x00, 0x0C, 0x00, 0x02, // item 0 at 0x04: "a", children at 0x04+0x0C
            0x00, 0x03, 0x00, 0x0A, 0x00, 0x01, // item 1 at 0x0A: "b", children at 0x0A+0x0A
            0x01, 0x00, 0x02, 0x00,             // children of item 0
            0x03, 0x00,                         // children of item 1
        ];
        assert_eq!(file, expected);

        let pool_base = file.len();
        file.extend(encoder.into_string_pool());
        let decoded = PooledDecoder::new(&file, pool_base).decode_record(NESTED, 0).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_bad_string_offset_is_error() {
        let file = [0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let decoder = PooledDecoder::new(&file, 8);
        assert!(decoder.decode_record(HEADER, 0).is_err());
    }
}
