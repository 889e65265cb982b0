//! Whole-file layout reading and writing.

use tracing::{debug, warn};
use wuj_common::{BinaryReader, IntoBytes};
use wuj_schema::{Record, Section, Value};

use crate::header::{LayoutHeader, BYTE_ORDER_MARK, DEFAULT_VERSION, MAGIC};
use crate::schema::LAYOUT_SECTIONS;
use crate::{Error, Result};

/// Key of the format version in the textual form.
pub const VERSION_KEY: &str = "version";
/// Key of the top-level section list in the textual form.
pub const SECTIONS_KEY: &str = "sections";

/// A decoded layout: its version and the reconstructed section tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Format version from the header.
    pub version: u16,
    /// Top-level sections in file order.
    pub sections: Vec<Section>,
}

impl Layout {
    /// Create an empty layout.
    pub fn new(version: u16) -> Self {
        Self {
            version,
            sections: Vec::new(),
        }
    }

    /// Parse a layout file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        reader.expect_magic(MAGIC)?;
        reader.seek(0);

        let header: LayoutHeader = reader.read_struct()?;
        if header.bom.get() != BYTE_ORDER_MARK {
            return Err(Error::ByteOrderMark(header.bom.get()));
        }
        let header_size = header.header_size.get();
        if usize::from(header_size) < LayoutHeader::SIZE {
            return Err(Error::HeaderSize(header_size));
        }

        let declared = header.file_size.get() as usize;
        if declared > data.len() {
            return Err(Error::Truncated {
                declared,
                actual: data.len(),
            });
        }
        if declared < data.len() {
            warn!(declared, actual = data.len(), "ignoring bytes past the declared file size");
        }

        let sections = LAYOUT_SECTIONS.decode(&data[..declared], usize::from(header_size))?;
        debug!(
            version = header.version.get(),
            chunks = header.section_count.get(),
            top_level = sections.len(),
            "parsed layout"
        );

        Ok(Self {
            version: header.version.get(),
            sections,
        })
    }

    /// Encode the layout to a complete file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (body, chunks) = LAYOUT_SECTIONS.encode(&self.sections)?;
        let total = LayoutHeader::SIZE + body.len();

        let file_size = u32::try_from(total).map_err(|_| Error::TooLarge(total))?;
        let section_count = u16::try_from(chunks).map_err(|_| Error::TooLarge(total))?;
        let header = LayoutHeader::new(self.version, file_size, section_count);

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&body);
        debug!(bytes = total, chunks, "encoded layout");
        Ok(out)
    }

    /// Textual form: `{"version", "sections": [...]}`.
    pub fn to_record(&self) -> Record {
        Record::new().with(VERSION_KEY, u64::from(self.version)).with(
            SECTIONS_KEY,
            self.sections.iter().map(Section::to_record).collect::<Vec<_>>(),
        )
    }

    /// Inverse of [`Layout::to_record`]. A missing version defaults to the
    /// common one; a missing section list is empty.
    pub fn from_record(record: &Record) -> Result<Self> {
        let version = match record.get(VERSION_KEY) {
            None => DEFAULT_VERSION,
            Some(value) => value
                .as_u64()
                .and_then(|v| u16::try_from(v).ok())
                .ok_or_else(|| mismatch(VERSION_KEY, "16-bit integer", value))?,
        };

        let sections = match record.get(SECTIONS_KEY) {
            None => Vec::new(),
            Some(value) => value
                .as_list()
                .ok_or_else(|| mismatch(SECTIONS_KEY, "list", value))?
                .iter()
                .map(Section::from_record)
                .collect::<wuj_schema::Result<_>>()?,
        };

        Ok(Self { version, sections })
    }
}

fn mismatch(field: &str, expected: &'static str, actual: &Value) -> Error {
    wuj_schema::Error::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: actual.kind_name(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use wuj_schema::Tag;

    use super::*;
    use crate::schema::{GRP1, LYT1, PAN1, PIC1, TXL1};

    fn chunk(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&((body.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    fn fixed(text: &str, width: usize) -> Vec<u8> {
        let mut out = text.as_bytes().to_vec();
        out.resize(width, 0);
        out
    }

    fn pane_body(name: &str, alpha: u8, translation_x: f32) -> Vec<u8> {
        let mut body = vec![0x01, 0x04, alpha, 0x00];
        body.extend(fixed(name, 16));
        body.extend(fixed("", 8));
        body.extend(translation_x.to_be_bytes());
        for v in [0.0f32, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 608.0, 456.0] {
            body.extend(v.to_be_bytes());
        }
        body
    }

    fn sample_file() -> Vec<u8> {
        let mut lyt1 = vec![0x01, 0x00, 0x00, 0x00];
        lyt1.extend(608.0f32.to_be_bytes());
        lyt1.extend(456.0f32.to_be_bytes());

        // Two entries, then the name pool the entries point into.
        let mut txl1 = vec![0x00, 0x02, 0x00, 0x00];
        txl1.extend([0, 0, 0, 0x10, 0, 0, 0, 0, 0, 0, 0, 0x16, 0, 0, 0, 0]);
        txl1.extend(b"a.tpl\0b.tpl\0");

        let mut pic1 = pane_body("P_icon", 0xFF, -12.5);
        pic1.extend([0xAA, 0xBB, 0xCC, 0xDD]);

        let mut grp1 = fixed("RootGroup", 16);
        grp1.extend([0x00, 0x01, 0x00, 0x00]);
        grp1.extend(fixed("P_icon", 16));

        let chunks = [
            chunk(b"lyt1", &lyt1),
            chunk(b"txl1", &txl1),
            chunk(b"pan1", &pane_body("RootPane", 0xFF, 0.0)),
            chunk(b"pas1", &[]),
            chunk(b"pic1", &pic1),
            chunk(b"pae1", &[]),
            chunk(b"grp1", &grp1),
            chunk(b"grs1", &[]),
            chunk(b"grp1", &fixed("Sub", 16).into_iter().chain([0; 4]).collect::<Vec<_>>()),
            chunk(b"gre1", &[]),
        ];
        let body = chunks.concat();

        let mut file = LayoutHeader::new(0x0A, (0x10 + body.len()) as u32, chunks.len() as u16)
            .as_bytes()
            .to_vec();
        file.extend(body);
        file
    }

    #[test]
    fn test_parse_sample() {
        let layout = Layout::parse(&sample_file()).unwrap();
        assert_eq!(layout.version, 0x0A);

        let tags: Vec<Tag> = layout.sections.iter().map(|s| s.tag).collect();
        assert_eq!(tags, [LYT1, TXL1, PAN1, GRP1]);

        let lyt1 = &layout.sections[0].attributes;
        assert_eq!(lyt1.get("centered"), Some(&Value::Bool(true)));
        assert_eq!(lyt1.get("size x"), Some(&Value::Float(608.0)));

        let txl1 = &layout.sections[1];
        let tpls = txl1.attributes.get("tpls").and_then(Value::as_list).unwrap();
        assert_eq!(tpls.len(), 2);
        assert_eq!(tpls[1].get("name"), Some(&Value::Int(0x16)));
        assert_eq!(txl1.trailing, b"a.tpl\0b.tpl\0");

        let root = &layout.sections[2];
        assert_eq!(root.attributes.get("name"), Some(&Value::from("RootPane")));
        assert_eq!(root.attributes.get("origin"), Some(&Value::Int(4)));
        let icon = &root.children()[0];
        assert_eq!(icon.tag, PIC1);
        assert_eq!(icon.attributes.get("translation x"), Some(&Value::Float(-12.5)));
        assert_eq!(icon.trailing, [0xAA, 0xBB, 0xCC, 0xDD]);
        assert!(!icon.has_child_scope());

        let group = &layout.sections[3];
        let panes = group.attributes.get("panes").and_then(Value::as_list).unwrap();
        assert_eq!(panes[0].get("name"), Some(&Value::from("P_icon")));
        assert_eq!(group.children()[0].attributes.get("name"), Some(&Value::from("Sub")));
    }

    #[test]
    fn test_roundtrip_is_byte_identical() {
        let file = sample_file();
        let layout = Layout::parse(&file).unwrap();
        assert_eq!(layout.to_bytes().unwrap(), file);

        let reparsed = Layout::from_record(&layout.to_record()).unwrap();
        assert_eq!(reparsed, layout);
        assert_eq!(reparsed.to_bytes().unwrap(), file);
    }

    #[test]
    fn test_text_roundtrip() {
        let layout = Layout::parse(&sample_file()).unwrap();
        let text = serde_json::to_string_pretty(&layout.to_record()).unwrap();
        assert!(text.starts_with("{\n  \"version\": 10,\n  \"sections\": ["));

        let record: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(Layout::from_record(&record).unwrap().to_bytes().unwrap(), sample_file());
    }

    #[test]
    fn test_non_finite_floats_survive_text() {
        let mut lyt1 = vec![0x00, 0x00, 0x00, 0x00];
        lyt1.extend(f32::NAN.to_be_bytes());
        lyt1.extend(f32::INFINITY.to_be_bytes());
        let body = chunk(b"lyt1", &lyt1);
        let mut file = LayoutHeader::new(0x0A, (0x10 + body.len()) as u32, 1).as_bytes().to_vec();
        file.extend(body);

        let text = serde_json::to_string_pretty(&Layout::parse(&file).unwrap().to_record()).unwrap();
        assert!(text.contains("\"size x\": \"NaN\""));
        assert!(text.contains("\"size y\": \"inf\""));

        let record: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(Layout::from_record(&record).unwrap().to_bytes().unwrap(), file);
    }

    #[test]
    fn test_header_checks() {
        let mut file = sample_file();
        file[4] = 0xFF;
        file[5] = 0xFE;
        assert!(matches!(Layout::parse(&file), Err(Error::ByteOrderMark(0xFFFE))));

        let mut file = sample_file();
        file[0] = b'X';
        assert!(matches!(
            Layout::parse(&file),
            Err(Error::Common(wuj_common::Error::InvalidMagic { .. }))
        ));

        let file = sample_file();
        assert!(matches!(
            Layout::parse(&file[..file.len() - 1]),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_misplaced_scope_is_reported() {
        let body = [chunk(b"lyt1", &[0; 12]), chunk(b"pas1", &[])].concat();
        let mut file = LayoutHeader::new(0x0A, (0x10 + body.len()) as u32, 2).as_bytes().to_vec();
        file.extend(body);

        let err = Layout::parse(&file).unwrap_err();
        assert_eq!(err.to_string(), "unexpected pas1 after lyt1 at offset 0x24 (expected pan1)");
    }

    #[test]
    fn test_from_record_defaults() {
        let layout = Layout::from_record(&Record::new()).unwrap();
        assert_eq!(layout, Layout::new(DEFAULT_VERSION));
        assert_eq!(layout.to_bytes().unwrap().len(), LayoutHeader::SIZE);

        let bad = Record::new().with(VERSION_KEY, "ten");
        assert!(Layout::from_record(&bad).is_err());
    }
}
