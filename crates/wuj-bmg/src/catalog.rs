//! Whole-file message catalog reading and writing.

use tracing::{debug, trace};
use wuj_common::{BinaryReader, ChunkHeader, IntoBytes, Tag};
use wuj_schema::{Record, StringTable, Value};

use crate::header::{IdHeader, InfoHeader, MessageHeader, ENCODING_UTF16, MAGIC, SECTION_ALIGNMENT};
use crate::text::{decode_text, encode_text};
use crate::{Error, Result};

pub const INF1: Tag = Tag::new(b"INF1");
pub const DAT1: Tag = Tag::new(b"DAT1");
pub const MID1: Tag = Tag::new(b"MID1");

/// Entry size written for a catalog without messages.
pub const DEFAULT_ENTRY_SIZE: u16 = 8;

/// Id format written when a textual catalog has ids but names no format.
pub const DEFAULT_ID_FORMAT: u8 = 0x10;

/// Size of the text offset at the start of every `INF1` entry.
const TEXT_OFFSET_SIZE: usize = 4;

/// A single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message id from `MID1`, if the catalog has one.
    pub id: Option<u32>,
    /// Raw attribute bytes following the text offset in the `INF1` entry.
    pub attributes: Vec<u8>,
    /// Message text with escapes in `{hex}` form.
    pub text: String,
}

/// Layout information of the `MID1` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdTable {
    pub format: u8,
    pub info: u8,
}

/// A section the catalog does not interpret, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraSection {
    pub tag: Tag,
    /// Section body after the chunk header, padding included.
    pub data: Vec<u8>,
}

/// A decoded message catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    pub file_id: u16,
    pub default_color: u8,
    /// Present if the catalog has a `MID1` section.
    pub ids: Option<IdTable>,
    pub messages: Vec<Message>,
    pub extra_sections: Vec<ExtraSection>,
}

impl MessageCatalog {
    /// Parse a catalog file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        reader.expect_magic(MAGIC)?;
        reader.seek(0);

        let header: MessageHeader = reader.read_struct()?;
        if header.encoding != ENCODING_UTF16 {
            return Err(Error::UnsupportedEncoding(header.encoding));
        }
        let declared = header.file_size.get() as usize;
        if declared > data.len() {
            return Err(Error::Truncated {
                declared,
                actual: data.len(),
            });
        }
        let data = &data[..declared];

        let mut info = None;
        let mut pool = None;
        let mut ids = None;
        let mut extra_sections = Vec::new();
        let mut cursor = MessageHeader::SIZE;

        for _ in 0..header.section_count.get() {
            let chunk: ChunkHeader = BinaryReader::new_at(data, cursor).read_struct()?;
            let tag = chunk.tag()?;
            let size = chunk.size() as usize;
            if size < ChunkHeader::SIZE || size > data.len() - cursor {
                return Err(Error::InvalidSectionSize {
                    tag,
                    offset: cursor,
                    size,
                });
            }
            trace!(%tag, offset = cursor, size, "section");

            let body = &data[cursor + ChunkHeader::SIZE..cursor + size];
            match tag {
                INF1 => set_once(&mut info, tag, body)?,
                DAT1 => set_once(&mut pool, tag, body)?,
                MID1 => set_once(&mut ids, tag, body)?,
                _ => extra_sections.push(ExtraSection {
                    tag,
                    data: body.to_vec(),
                }),
            }
            cursor += size;
        }

        let info = info.ok_or(Error::MissingSection(INF1))?;
        let pool = pool.ok_or(Error::MissingSection(DAT1))?;

        let mut reader = BinaryReader::new(info);
        let info_header: InfoHeader = reader.read_struct()?;
        let entry_size = info_header.entry_size.get();
        let attribute_size = usize::from(entry_size)
            .checked_sub(TEXT_OFFSET_SIZE)
            .ok_or(Error::EntrySize(entry_size))?;

        let mut messages = Vec::with_capacity(usize::from(info_header.count.get()));
        for _ in 0..info_header.count.get() {
            let offset = reader.read_u32()? as usize;
            let attributes = reader.read_bytes(attribute_size)?.to_vec();
            messages.push(Message {
                id: None,
                attributes,
                text: decode_text(pool, offset)?,
            });
        }

        let ids = match ids {
            None => None,
            Some(body) => {
                let mut reader = BinaryReader::new(body);
                let id_header: IdHeader = reader.read_struct()?;
                let count = usize::from(id_header.count.get());
                if count != messages.len() {
                    return Err(Error::IdCount {
                        ids: count,
                        messages: messages.len(),
                    });
                }
                for message in &mut messages {
                    message.id = Some(reader.read_u32()?);
                }
                Some(IdTable {
                    format: id_header.format,
                    info: id_header.info,
                })
            }
        };

        debug!(
            messages = messages.len(),
            extra = extra_sections.len(),
            "parsed message catalog"
        );

        Ok(Self {
            file_id: info_header.file_id.get(),
            default_color: info_header.default_color,
            ids,
            messages,
            extra_sections,
        })
    }

    /// Bytes per `INF1` entry. Every message must carry the same number of
    /// attribute bytes.
    pub fn entry_size(&self) -> Result<u16> {
        let Some(first) = self.messages.first() else {
            return Ok(DEFAULT_ENTRY_SIZE);
        };
        let expected = first.attributes.len();
        for (index, message) in self.messages.iter().enumerate() {
            if message.attributes.len() != expected {
                return Err(Error::AttributeSize {
                    index,
                    expected,
                    actual: message.attributes.len(),
                });
            }
        }
        u16::try_from(expected + TEXT_OFFSET_SIZE).map_err(|_| Error::EntrySize(u16::MAX))
    }

    /// Encode the catalog. Sections are written as `INF1`, `DAT1`, `MID1`
    /// (when the catalog has ids), then the extra sections in order.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let entry_size = self.entry_size()?;
        let count = u16::try_from(self.messages.len()).map_err(|_| wuj_schema::Error::CountOverflow {
            field: MESSAGES_KEY.to_string(),
            count: self.messages.len(),
        })?;

        let mut pool = StringTable::utf16();
        let info_header = InfoHeader {
            count: count.into(),
            entry_size: entry_size.into(),
            file_id: self.file_id.into(),
            default_color: self.default_color,
            padding: 0,
        };
        let mut info = info_header.as_bytes().to_vec();
        for message in &self.messages {
            let offset = pool.insert_bytes(&encode_text(&message.text)?);
            let offset = u32::try_from(offset).map_err(|_| Error::TooLarge(offset))?;
            info.extend_from_slice(&offset.to_be_bytes());
            info.extend_from_slice(&message.attributes);
        }

        let mut sections = vec![(INF1, info), (DAT1, pool.into_bytes())];
        if let Some(table) = self.ids {
            let id_header = IdHeader {
                count: count.into(),
                format: table.format,
                info: table.info,
                padding: [0; 4],
            };
            let mut body = id_header.as_bytes().to_vec();
            for (index, message) in self.messages.iter().enumerate() {
                let id = message.id.ok_or(Error::MissingId(index))?;
                body.extend_from_slice(&id.to_be_bytes());
            }
            sections.push((MID1, body));
        }
        sections.extend(self.extra_sections.iter().map(|s| (s.tag, s.data.clone())));

        let mut out = vec![0; MessageHeader::SIZE];
        for (tag, body) in &sections {
            write_section(&mut out, *tag, body)?;
        }

        let file_size = u32::try_from(out.len()).map_err(|_| Error::TooLarge(out.len()))?;
        let header = MessageHeader::new(file_size, sections.len() as u32, ENCODING_UTF16);
        out[..MessageHeader::SIZE].copy_from_slice(header.as_bytes());

        debug!(bytes = out.len(), sections = sections.len(), "encoded message catalog");
        Ok(out)
    }
}

fn set_once<'a>(slot: &mut Option<&'a [u8]>, tag: Tag, body: &'a [u8]) -> Result<()> {
    if slot.replace(body).is_some() {
        return Err(Error::DuplicateSection(tag));
    }
    Ok(())
}

/// Append a chunk, padding it to [`SECTION_ALIGNMENT`].
fn write_section(out: &mut Vec<u8>, tag: Tag, body: &[u8]) -> Result<()> {
    let size = (ChunkHeader::SIZE + body.len()).next_multiple_of(SECTION_ALIGNMENT);
    let header = ChunkHeader::new(tag, u32::try_from(size).map_err(|_| Error::TooLarge(size))?);
    let start = out.len();
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(body);
    out.resize(start + size, 0);
    Ok(())
}

pub const ENCODING_KEY: &str = "encoding";
pub const FILE_ID_KEY: &str = "file id";
pub const DEFAULT_COLOR_KEY: &str = "default color";
pub const ID_FORMAT_KEY: &str = "id format";
pub const ID_INFO_KEY: &str = "id info";
pub const MESSAGES_KEY: &str = "messages";
pub const EXTRA_SECTIONS_KEY: &str = "extra sections";

const ID_KEY: &str = "id";
const ATTRIBUTES_KEY: &str = "attributes";
const TEXT_KEY: &str = "text";
const MAGIC_KEY: &str = "magic";
const DATA_KEY: &str = "data";

impl MessageCatalog {
    /// Textual form.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with(ENCODING_KEY, u64::from(ENCODING_UTF16))
            .with(FILE_ID_KEY, u64::from(self.file_id))
            .with(DEFAULT_COLOR_KEY, u64::from(self.default_color));
        if let Some(table) = self.ids {
            record.insert(ID_FORMAT_KEY, u64::from(table.format));
            record.insert(ID_INFO_KEY, u64::from(table.info));
        }

        let messages: Vec<Record> = self
            .messages
            .iter()
            .map(|message| {
                let mut item = Record::with_capacity(3);
                if let Some(id) = message.id {
                    item.insert(ID_KEY, u64::from(id));
                }
                item.insert(ATTRIBUTES_KEY, hex::encode(&message.attributes));
                item.insert(TEXT_KEY, message.text.as_str());
                item
            })
            .collect();
        record.insert(MESSAGES_KEY, messages);

        let extra: Vec<Record> = self
            .extra_sections
            .iter()
            .map(|section| {
                Record::new()
                    .with(MAGIC_KEY, section.tag.as_str())
                    .with(DATA_KEY, hex::encode(&section.data))
            })
            .collect();
        record.insert(EXTRA_SECTIONS_KEY, extra);
        record
    }

    /// Inverse of [`MessageCatalog::to_record`].
    ///
    /// The id table is kept if the record names an id format or any message
    /// carries an id; then every message must carry one.
    pub fn from_record(record: &Record) -> Result<Self> {
        let encoding = integer(record, ENCODING_KEY, u8::MAX.into())?.unwrap_or(ENCODING_UTF16.into()) as u8;
        if encoding != ENCODING_UTF16 {
            return Err(Error::UnsupportedEncoding(encoding));
        }

        let messages = list(record, MESSAGES_KEY)?
            .iter()
            .map(|item| {
                Ok(Message {
                    id: integer(item, ID_KEY, u32::MAX.into())?.map(|id| id as u32),
                    attributes: bytes(item, ATTRIBUTES_KEY)?,
                    text: string(item, TEXT_KEY)?.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let format = integer(record, ID_FORMAT_KEY, u8::MAX.into())?;
        let ids = if format.is_some() || messages.iter().any(|m| m.id.is_some()) {
            Some(IdTable {
                format: format.map_or(DEFAULT_ID_FORMAT, |f| f as u8),
                info: integer(record, ID_INFO_KEY, u8::MAX.into())?.unwrap_or_default() as u8,
            })
        } else {
            None
        };

        let extra_sections = list(record, EXTRA_SECTIONS_KEY)?
            .iter()
            .map(|item| {
                let tag = string(item, MAGIC_KEY)?.parse::<Tag>()?;
                Ok(ExtraSection {
                    tag,
                    data: bytes(item, DATA_KEY)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            file_id: integer(record, FILE_ID_KEY, u16::MAX.into())?.unwrap_or_default() as u16,
            default_color: integer(record, DEFAULT_COLOR_KEY, u8::MAX.into())?.unwrap_or_default() as u8,
            ids,
            messages,
            extra_sections,
        })
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

fn integer(record: &Record, key: &str, max: u64) -> Result<Option<u64>> {
    let Some(value) = record.get(key) else {
        return Ok(None);
    };
    let v = value.as_u64().ok_or_else(|| mismatch(key, "integer", value))?;
    if v > max {
        return Err(wuj_schema::Error::IntegerOutOfRange {
            field: key.to_string(),
            value: v,
            max,
        }
        .into());
    }
    Ok(Some(v))
}

fn string<'r>(record: &'r Record, key: &str) -> Result<&'r str> {
    match record.get(key) {
        None => Ok(""),
        Some(value) => value.as_str().ok_or_else(|| mismatch(key, "string", value)),
    }
}

fn bytes(record: &Record, key: &str) -> Result<Vec<u8>> {
    hex::decode(string(record, key)?).map_err(|source| {
        wuj_schema::Error::InvalidHex {
            field: key.to_string(),
            source,
        }
        .into()
    })
}

fn list<'r>(record: &'r Record, key: &str) -> Result<&'r [Record]> {
    match record.get(key) {
        None => Ok(&[]),
        Some(value) => value.as_list().ok_or_else(|| mismatch(key, "list", value)),
    }
}
