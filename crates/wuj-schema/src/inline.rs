//! Contiguous addressing mode.
//!
//! Fields are read at a running cursor from the record start. Arrays store a
//! 16-bit element count in the record and their elements at a fixed distance
//! from the record start, so a record's encoded form is its fixed part
//! followed by the payload of each array at its declared offset.

use wuj_common::BinaryReader;

use crate::field::{record_size, Field, InlineKind};
use crate::{Error, Record, Result, Value};

/// Decode a record starting at `record_offset`.
///
/// Returns the record and the end offset of everything it describes: the
/// fixed part and all array payloads, whichever reaches further.
pub fn decode_record(
    fields: &[Field<InlineKind>],
    data: &[u8],
    record_offset: usize,
) -> Result<(Record, usize)> {
    let mut record = Record::with_capacity(fields.len());
    let mut cursor = record_offset;
    let mut end = record_offset + record_size(fields);

    for field in fields {
        let value = match field.kind {
            InlineKind::Primitive(p) => p.decode(data, cursor)?,
            InlineKind::Array {
                start_offset,
                fields: nested,
            } => {
                let (items, array_end) =
                    decode_array(nested, data, cursor, record_offset + start_offset)?;
                end = end.max(array_end);
                Some(Value::List(items))
            }
        };

        if let (Some(name), Some(value)) = (field.name, value) {
            record.insert(name, value);
        }
        cursor += field.size();
    }

    Ok((record, end))
}

/// Decode an array whose count is at `count_offset` and whose elements start
/// at `payload_offset`. Returns the elements and the payload end offset.
pub fn decode_array(
    fields: &[Field<InlineKind>],
    data: &[u8],
    count_offset: usize,
    payload_offset: usize,
) -> Result<(Vec<Record>, usize)> {
    let count = BinaryReader::new_at(data, count_offset).read_u16()? as usize;
    let stride = record_size(fields);

    let mut items = Vec::with_capacity(count);
    let mut end = payload_offset;
    for i in 0..count {
        let (item, item_end) = decode_record(fields, data, payload_offset + i * stride)?;
        end = end.max(item_end);
        items.push(item);
    }

    Ok((items, end.max(payload_offset + count * stride)))
}

/// Encode a record: the fixed part followed by each array payload at its
/// declared offset (zero-filling any gap before it).
pub fn encode_record(fields: &[Field<InlineKind>], record: &Record) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(record_size(fields));
    let mut payloads = Vec::new();

    for field in fields {
        let value = field.name.and_then(|name| record.get(name));
        match field.kind {
            InlineKind::Primitive(p) if field.name.is_none() => {
                out.resize(out.len() + p.size(), 0);
            }
            InlineKind::Primitive(p) => p.encode(field.label(), value, &mut out)?,
            InlineKind::Array {
                start_offset,
                fields: nested,
            } => {
                let items = list(field.label(), value)?;
                let count = u16::try_from(items.len()).map_err(|_| Error::CountOverflow {
                    field: field.label().to_string(),
                    count: items.len(),
                })?;
                out.extend_from_slice(&count.to_be_bytes());
                payloads.push((field.label(), start_offset, encode_array(field.label(), nested, items)?));
            }
        }
    }

    for (label, start_offset, payload) in payloads {
        if out.len() > start_offset {
            return Err(Error::ArrayOverlap {
                field: label.to_string(),
                start_offset,
                written: out.len(),
            });
        }
        out.resize(start_offset, 0);
        out.extend_from_slice(&payload);
    }

    Ok(out)
}

/// Encode array elements back to back; each must be exactly one stride.
fn encode_array(label: &str, fields: &[Field<InlineKind>], items: &[Record]) -> Result<Vec<u8>> {
    let stride = record_size(fields);
    let mut out = Vec::with_capacity(stride * items.len());
    for item in items {
        let bytes = encode_record(fields, item)?;
        if bytes.len() != stride {
            return Err(Error::ElementSize {
                field: label.to_string(),
                expected: stride,
                actual: bytes.len(),
            });
        }
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

/// Resolve an array field's value; absent means empty.
pub(crate) fn list<'v>(field: &str, value: Option<&'v Value>) -> Result<&'v [Record]> {
    match value {
        None => Ok(&[]),
        Some(Value::List(items)) => Ok(items),
        Some(other) => Err(Error::TypeMismatch {
            field: field.to_string(),
            expected: "list",
            actual: other.kind_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANE_NAME: &[Field<InlineKind>] = &[Field::new("name", InlineKind::string(8))];

    const GROUP: &[Field<InlineKind>] = &[
        Field::new("id", InlineKind::U16),
        Field::new("panes", InlineKind::array(0x08, PANE_NAME)),
        Field::padding(InlineKind::pad(2)),
        Field::new("visible", InlineKind::BOOL8),
        Field::padding(InlineKind::pad(1)),
    ];

    fn group_bytes() -> Vec<u8> {
        let mut data = vec![0x00, 0x07, 0x00, 0x02, 0x00, 0x00, 0x01, 0x00];
        data.extend_from_slice(b"N_a\0\0\0\0\0");
        data.extend_from_slice(b"N_bb\0\0\0\0");
        data
    }

    #[test]
    fn test_decode_array_after_record() {
        let data = group_bytes();
        let (record, end) = decode_record(GROUP, &data, 0).unwrap();

        assert_eq!(end, data.len());
        assert_eq!(record.get("id"), Some(&Value::Int(7)));
        assert_eq!(record.get("visible"), Some(&Value::Bool(true)));
        let panes = record.get("panes").and_then(Value::as_list).unwrap();
        let names: Vec<_> = panes.iter().map(|p| p.get("name").unwrap().clone()).collect();
        assert_eq!(names, [Value::from("N_a"), Value::from("N_bb")]);

        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["id", "panes", "visible"]);
    }

    #[test]
    fn test_encode_roundtrip() {
        let data = group_bytes();
        let (record, _) = decode_record(GROUP, &data, 0).unwrap();
        assert_eq!(encode_record(GROUP, &record).unwrap(), data);
    }

    #[test]
    fn test_decode_at_offset() {
        let mut data = vec![0xAA; 3];
        data.extend(group_bytes());
        let (record, end) = decode_record(GROUP, &data, 3).unwrap();
        assert_eq!(end, data.len());
        assert_eq!(record.get("panes").and_then(Value::as_list).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_array() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let (record, end) = decode_record(GROUP, &data, 0).unwrap();

        assert_eq!(end, 8);
        assert_eq!(record.get("panes"), Some(&Value::List(Vec::new())));
        assert_eq!(encode_record(GROUP, &record).unwrap(), data);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let bytes = encode_record(GROUP, &Record::new()).unwrap();
        assert_eq!(bytes, [0u8; 8]);
    }

    #[test]
    fn test_payload_gap_is_zero_filled() {
        const GAPPED: &[Field<InlineKind>] = &[
            Field::new("items", InlineKind::array(0x04, &[Field::new("v", InlineKind::U8)])),
        ];
        let record = Record::new().with("items", vec![Record::new().with("v", 9u64)]);
        assert_eq!(encode_record(GAPPED, &record).unwrap(), [0x00, 0x01, 0x00, 0x00, 0x09]);

        let (decoded, end) = decode_record(GAPPED, &[0x00, 0x01, 0xFF, 0xFF, 0x09], 0).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(end, 5);
    }

    #[test]
    fn test_overlapping_payload_is_error() {
        const OVERLAP: &[Field<InlineKind>] = &[
            Field::new("items", InlineKind::array(0x00, &[Field::new("v", InlineKind::U8)])),
        ];
        let record = Record::new().with("items", vec![Record::new()]);
        assert!(matches!(
            encode_record(OVERLAP, &record),
            Err(Error::ArrayOverlap { written: 2, .. })
        ));
    }

    #[test]
    fn test_truncated_array_is_error() {
        let data = group_bytes();
        assert!(decode_record(GROUP, &data[..20], 0).is_err());
    }
}
