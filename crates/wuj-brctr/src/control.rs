//! Whole-file control reading and writing.

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, warn};
use wuj_common::BinaryReader;
use wuj_schema::{field_offset, Field, PooledDecoder, PooledEncoder, PooledKind, Record, Value};

use crate::schema::{
    ANIMATION_HEADER, ANIMATION_OFFSET_KEY, HEADER, HEADER_STRINGS, LAYOUT_HEADER, LAYOUT_OFFSET_KEY,
    MAGIC_KEY, STRINGS_OFFSET_KEY, VERSION_KEY,
};
use crate::{Error, Result};

/// Control file magic.
pub const MAGIC: &[u8; 4] = b"bctr";

/// Version written when a textual control file does not name one.
pub const DEFAULT_VERSION: u16 = 2;

/// A decoded control file.
///
/// The textual form is one flat record: the version, the three header
/// strings, then the fields of the animation and layout headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    /// Format version.
    pub version: u16,
    /// Header strings keyed by [`HEADER_STRINGS`].
    pub strings: Record,
    /// Animation header fields.
    pub animation: Record,
    /// Layout header fields.
    pub layout: Record,
}

impl Control {
    /// Parse a control file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        BinaryReader::new(data).expect_magic(MAGIC)?;

        let mut reader = BinaryReader::new_at(data, 0x0C);
        let animation_offset = reader.read_u16()? as usize;
        let layout_offset = reader.read_u16()? as usize;
        let strings_offset = reader.read_u16()? as usize;
        for (name, offset) in [
            (ANIMATION_OFFSET_KEY, animation_offset),
            (LAYOUT_OFFSET_KEY, layout_offset),
            (STRINGS_OFFSET_KEY, strings_offset),
        ] {
            if offset > data.len() {
                return Err(Error::OffsetOutOfBounds {
                    name,
                    offset,
                    len: data.len(),
                });
            }
        }

        let decoder = PooledDecoder::new(data, strings_offset);
        let mut header = decoder.decode_record(HEADER, 0)?;
        let version = header.get(VERSION_KEY).and_then(Value::as_u64).unwrap_or_default() as u16;
        for key in [MAGIC_KEY, VERSION_KEY, ANIMATION_OFFSET_KEY, LAYOUT_OFFSET_KEY, STRINGS_OFFSET_KEY] {
            header.remove(key);
        }

        let animation = decoder.decode_record(ANIMATION_HEADER, animation_offset)?;
        let layout = decoder.decode_record(LAYOUT_HEADER, layout_offset)?;
        debug!(version, animation_offset, layout_offset, strings_offset, "parsed control file");

        Ok(Self {
            version,
            strings: header,
            animation,
            layout,
        })
    }

    /// Encode the control file.
    ///
    /// Header strings are interned first, then the animation and layout
    /// headers with their side data, then the string pool. Offsets in the
    /// header are patched once the preceding sizes are known.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut encoder = PooledEncoder::new();

        let mut header = self.strings.clone();
        header.insert(MAGIC_KEY, "bctr");
        header.insert(VERSION_KEY, u64::from(self.version));
        let mut out = encoder.encode_record(HEADER, &header)?;

        let animation_offset = out.len();
        out.extend(encoder.encode_record(ANIMATION_HEADER, &self.animation)?);
        let layout_offset = out.len();
        out.extend(encoder.encode_record(LAYOUT_HEADER, &self.layout)?);
        let strings_offset = out.len();

        patch(&mut out, ANIMATION_OFFSET_KEY, animation_offset)?;
        patch(&mut out, LAYOUT_OFFSET_KEY, layout_offset)?;
        patch(&mut out, STRINGS_OFFSET_KEY, strings_offset)?;

        out.extend(encoder.into_string_pool());
        debug!(bytes = out.len(), strings_offset, "encoded control file");
        Ok(out)
    }

    /// Flat textual form.
    pub fn to_record(&self) -> Record {
        let mut record = Record::with_capacity(1 + self.strings.len() + self.animation.len() + self.layout.len());
        record.insert(VERSION_KEY, u64::from(self.version));
        record.merge(self.strings.clone());
        record.merge(self.animation.clone());
        record.merge(self.layout.clone());
        record
    }

    /// Split a flat textual record back into its parts. Keys that belong to
    /// no part are ignored.
    pub fn from_record(record: &Record) -> Result<Self> {
        let version = match record.get(VERSION_KEY) {
            None => DEFAULT_VERSION,
            Some(value) => value
                .as_u64()
                .and_then(|v| u16::try_from(v).ok())
                .ok_or_else(|| wuj_schema::Error::TypeMismatch {
                    field: VERSION_KEY.to_string(),
                    expected: "16-bit integer",
                    actual: value.kind_name(),
                })?,
        };

        let strings = HEADER_STRINGS
            .iter()
            .filter_map(|&name| record.get(name).map(|v| (name, v.clone())))
            .collect();
        let animation = pick(ANIMATION_HEADER, record);
        let layout = pick(LAYOUT_HEADER, record);

        for (name, _) in record.iter() {
            let known = name == VERSION_KEY
                || HEADER_STRINGS.contains(&name)
                || animation.contains_key(name)
                || layout.contains_key(name);
            if !known {
                warn!(key = name, "ignoring unknown control field");
            }
        }

        Ok(Self {
            version,
            strings,
            animation,
            layout,
        })
    }
}

fn pick(fields: &[Field<PooledKind>], record: &Record) -> Record {
    fields
        .iter()
        .filter_map(|field| field.name)
        .filter_map(|name| record.get(name).map(|v| (name, v.clone())))
        .collect()
}

fn patch(out: &mut [u8], key: &str, offset: usize) -> Result<()> {
    let value = u16::try_from(offset).map_err(|_| wuj_schema::Error::OffsetOverflow { offset })?;
    let at = field_offset(HEADER, key).ok_or_else(|| wuj_schema::Error::MissingField(key.to_string()))?;
    BigEndian::write_u16(&mut out[at..at + 2], value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new()
            .with("version", 2u64)
            .with("main brlyt", "menu")
            .with("bmg", "")
            .with("picture source brlyt", "")
            .with(
                "groups",
                vec![Record::new()
                    .with("name", "G")
                    .with("pane", "P")
                    .with("first animation", 0u64)
                    .with("animation count", 1u64)],
            )
            .with(
                "animations",
                vec![Record::new()
                    .with("name", "A")
                    .with("brlan", "a.brlan")
                    .with("next", "")
                    .with("reversed", false)
                    .with("speed", 1.0)],
            )
            .with(
                "variants",
                vec![Record::new()
                    .with("name", "V")
                    .with("opacity", 255u64)
                    .with("animated", true)
                    .with("animation delay", 0.0)
                    .with("translation x 4:3", 0.0)
                    .with("translation y 4:3", 0.0)
                    .with("translation z 4:3", 0.0)
                    .with("scale x 4:3", 1.0)
                    .with("scale y 4:3", 1.0)
                    .with("translation x 16:9", -12.5)
                    .with("translation y 16:9", 0.0)
                    .with("translation z 16:9", 0.0)
                    .with("scale x 16:9", 1.0)
                    .with("scale y 16:9", 1.0)
                    .with("first message", 0u64)
                    .with("message count", 1u64)
                    .with("first picture", 0u64)
                    .with("picture count", 0u64)],
            )
            .with(
                "messages",
                vec![Record::new()
                    .with("pane", "T_msg")
                    .with("name", "msg")
                    .with("message id", 0x1234u64)],
            )
            .with("pictures", Vec::<Record>::new())
    }

    #[test]
    fn test_encode_layout() {
        let bytes = Control::from_record(&sample()).unwrap().to_bytes().unwrap();

        #[rustfmt::skip]
        let header = [
            b'b', b'c', b't', b'r', 0x00, 0x02,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // "menu", "", ""
            0x00, 0x14, 0x00, 0x30, 0x00, 0x80, // animation, layout, strings
            0x00, 0x00,
        ];
        assert_eq!(bytes[..0x14], header);

        #[rustfmt::skip]
        let animation = [
            0x00, 0x08, 0x00, 0x01, // groups at +8
            0x00, 0x10, 0x00, 0x01, // animations at +16
            0x00, 0x06, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01,
            0x00, 0x0A, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x3F, 0x80, 0x00, 0x00,
        ];
        assert_eq!(bytes[0x14..0x30], animation);

        // variants at +12, messages at +72, no pictures at +80
        assert_eq!(bytes[0x30..0x3C], [0x00, 0x0C, 0x00, 0x01, 0x00, 0x48, 0x00, 0x01, 0x00, 0x50, 0x00, 0x00]);
        assert_eq!(bytes[0x3C..0x3E], [0x00, 0x14]);
        assert_eq!(bytes[0x78..0x80], [0x00, 0x16, 0x00, 0x1C, 0x00, 0x00, 0x12, 0x34]);
        assert_eq!(&bytes[0x80..], b"\0menu\0G\0P\0A\0a.brlan\0V\0T_msg\0msg\0");
    }

    #[test]
    fn test_roundtrip() {
        let control = Control::from_record(&sample()).unwrap();
        let bytes = control.to_bytes().unwrap();
        let parsed = Control::parse(&bytes).unwrap();

        assert_eq!(parsed, control);
        assert_eq!(parsed.to_record(), sample());
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_record_key_order() {
        let record = Control::parse(&Control::from_record(&sample()).unwrap().to_bytes().unwrap())
            .unwrap()
            .to_record();
        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            [
                "version",
                "main brlyt",
                "bmg",
                "picture source brlyt",
                "groups",
                "animations",
                "variants",
                "messages",
                "pictures"
            ]
        );
    }

    #[test]
    fn test_text_roundtrip() {
        let bytes = Control::from_record(&sample()).unwrap().to_bytes().unwrap();
        let text = serde_json::to_string_pretty(&Control::parse(&bytes).unwrap().to_record()).unwrap();
        let record: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(Control::from_record(&record).unwrap().to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_missing_fields_encode_empty() {
        let control = Control::from_record(&Record::new()).unwrap();
        assert_eq!(control.version, DEFAULT_VERSION);

        let bytes = control.to_bytes().unwrap();
        assert_eq!(bytes.len(), 0x14 + 8 + 12 + 1);
        let parsed = Control::parse(&bytes).unwrap();
        assert_eq!(parsed.strings.get("bmg"), Some(&Value::from("")));
        assert_eq!(parsed.animation.get("groups"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(
            Control::parse(b"RLYT\0\0\0\0"),
            Err(Error::Common(wuj_common::Error::InvalidMagic { .. }))
        ));

        let mut bytes = Control::from_record(&sample()).unwrap().to_bytes().unwrap();
        bytes[0x10] = 0x7F;
        assert!(matches!(
            Control::parse(&bytes),
            Err(Error::OffsetOutOfBounds { name: STRINGS_OFFSET_KEY, .. })
        ));

        let bad = Record::new().with("main brlyt", 3u64);
        assert!(Control::from_record(&bad).unwrap().to_bytes().is_err());
    }
}
