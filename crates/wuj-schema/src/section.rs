//! Section trees recovered from flat chunk streams.
//!
//! A tree-format file is a run of self-sized chunks (`tag`, `size`, body).
//! Nesting is not stored explicitly: a scope-open chunk makes the chunk just
//! before it the owner of every following chunk up to the matching
//! scope-close chunk. [`SectionTable`] describes one format's chunk schemas
//! and scope markers and converts between the stream and a tree of
//! [`Section`]s.

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, trace, warn};
use wuj_common::{BinaryReader, ChunkHeader, IntoBytes, Tag};

use crate::field::{Field, InlineKind};
use crate::{inline, Error, Record, Result, Value};

/// Key holding the chunk tag in a decoded record.
pub const TAG_KEY: &str = "magic";
/// Key holding the chunk size in a decoded record.
pub const SIZE_KEY: &str = "size";
/// Key holding undecoded trailing chunk bytes in textual form.
pub const DATA_KEY: &str = "data";
/// Key holding child sections in textual form.
pub const CHILDREN_KEY: &str = "children";

/// Maximum number of nested child scopes.
///
/// Deeper trees are rejected on decode and encode. Their textual form would
/// also exceed the nesting `serde_json` accepts when reading it back.
pub const MAX_DEPTH: usize = 48;

/// A chunk tag pair that opens and closes a child scope owned by `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRule {
    /// Tag of the chunk that owns the scope.
    pub owner: Tag,
    /// Tag that opens the scope; must directly follow an `owner` chunk.
    pub open: Tag,
    /// Tag that closes the scope.
    pub close: Tag,
}

/// A decoded chunk and, if it owned a child scope, its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Chunk tag.
    pub tag: Tag,
    /// Decoded fields, without the tag and size.
    pub attributes: Record,
    /// Chunk bytes after everything the schema describes.
    pub trailing: Vec<u8>,
    /// Child sections; `Some` only if this chunk was followed by a scope-open chunk.
    pub children: Option<Vec<Section>>,
}

impl Section {
    /// Create a section without children.
    pub fn new(tag: Tag, attributes: Record) -> Self {
        Self {
            tag,
            attributes,
            trailing: Vec::new(),
            children: None,
        }
    }

    /// Attach a child scope.
    pub fn with_children(mut self, children: Vec<Section>) -> Self {
        self.children = Some(children);
        self
    }

    /// Child sections, empty if this section owns no scope.
    pub fn children(&self) -> &[Section] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Whether this section owns a child scope (possibly empty).
    pub fn has_child_scope(&self) -> bool {
        self.children.is_some()
    }

    /// Total number of sections in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Section::count).sum::<usize>()
    }

    /// Textual form: tag first, then attributes, trailing bytes as hex, children.
    pub fn to_record(&self) -> Record {
        let mut record = Record::with_capacity(self.attributes.len() + 3);
        record.insert(TAG_KEY, self.tag.as_str());
        for (name, value) in self.attributes.iter() {
            record.insert(name, value.clone());
        }
        if !self.trailing.is_empty() {
            record.insert(DATA_KEY, hex::encode(&self.trailing));
        }
        if let Some(children) = &self.children {
            record.insert(
                CHILDREN_KEY,
                children.iter().map(Section::to_record).collect::<Vec<_>>(),
            );
        }
        record
    }

    /// Inverse of [`Section::to_record`].
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut tag = None;
        let mut attributes = Record::with_capacity(record.len());
        let mut trailing = Vec::new();
        let mut children = None;

        for (name, value) in record.iter() {
            match name {
                TAG_KEY => {
                    let text = value.as_str().ok_or_else(|| type_mismatch(name, "tag", value))?;
                    tag = Some(text.parse::<Tag>()?);
                }
                DATA_KEY => {
                    let text = value.as_str().ok_or_else(|| type_mismatch(name, "string", value))?;
                    trailing = hex::decode(text).map_err(|source| Error::InvalidHex {
                        field: name.to_string(),
                        source,
                    })?;
                }
                CHILDREN_KEY => {
                    let items = value.as_list().ok_or_else(|| type_mismatch(name, "list", value))?;
                    children = Some(items.iter().map(Section::from_record).collect::<Result<_>>()?);
                }
                SIZE_KEY => {}
                _ => attributes.insert(name, value.clone()),
            }
        }

        Ok(Self {
            tag: tag.ok_or_else(|| Error::MissingField(TAG_KEY.to_string()))?,
            attributes,
            trailing,
            children,
        })
    }
}

fn type_mismatch(field: &str, expected: &'static str, actual: &Value) -> Error {
    Error::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: actual.kind_name(),
    }
}

/// A format's chunk schemas and scope markers.
///
/// Every schema must begin with the tag ([`TAG_KEY`]) and size ([`SIZE_KEY`])
/// fields of the chunk header.
#[derive(Debug, Clone, Copy)]
pub struct SectionTable {
    /// Schema per ordinary chunk tag.
    pub schemas: &'static [(Tag, &'static [Field<InlineKind>])],
    /// Scope markers.
    pub scopes: &'static [ScopeRule],
}

impl SectionTable {
    /// Schema registered for `tag`.
    pub fn schema(&self, tag: Tag) -> Option<&'static [Field<InlineKind>]> {
        self.schemas
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, fields)| *fields)
    }

    fn opened_by(&self, tag: Tag) -> Option<&ScopeRule> {
        self.scopes.iter().find(|rule| rule.open == tag)
    }

    fn closed_by(&self, tag: Tag) -> Option<&ScopeRule> {
        self.scopes.iter().find(|rule| rule.close == tag)
    }

    fn owned_by(&self, tag: Tag) -> Option<&ScopeRule> {
        self.scopes.iter().find(|rule| rule.owner == tag)
    }

    /// Decode every chunk of `data` from `base` to the end into a section tree.
    pub fn decode(&self, data: &[u8], base: usize) -> Result<Vec<Section>> {
        let (_, sections) = self.decode_level(data, base, None, 0)?;
        debug!(count = sections.len(), "decoded top-level sections");
        Ok(sections)
    }

    /// Decode one sibling list. At the top level (`parent == None`) this runs to
    /// the end of `data`; inside a scope it returns after the closing chunk.
    /// Returns the cursor after the last consumed chunk. `depth` counts the
    /// enclosing scopes.
    fn decode_level(
        &self,
        data: &[u8],
        mut cursor: usize,
        parent: Option<Tag>,
        depth: usize,
    ) -> Result<(usize, Vec<Section>)> {
        let mut siblings: Vec<Section> = Vec::new();
        let mut previous: Option<Tag> = None;

        while cursor < data.len() {
            let header: ChunkHeader = BinaryReader::new_at(data, cursor).read_struct()?;
            let tag = header
                .tag()
                .map_err(|_| wuj_common::Error::NonAscii { offset: cursor })?;
            let size = header.size() as usize;
            if size < ChunkHeader::SIZE || size > data.len() - cursor {
                return Err(Error::InvalidChunkSize {
                    tag,
                    offset: cursor,
                    size,
                });
            }
            let next = cursor + size;
            trace!(%tag, offset = cursor, size, "chunk");

            let is_marker = self.opened_by(tag).is_some() || self.closed_by(tag).is_some();
            if is_marker && size != ChunkHeader::SIZE {
                warn!(%tag, offset = cursor, size, "dropping scope marker body");
            }

            if let Some(rule) = self.opened_by(tag) {
                let owner = match siblings.last_mut() {
                    Some(owner) if previous == Some(rule.owner) => owner,
                    _ => {
                        return Err(Error::UnexpectedScopeOpen {
                            tag,
                            previous,
                            expected: rule.owner,
                            offset: cursor,
                        })
                    }
                };
                if depth >= MAX_DEPTH {
                    return Err(Error::NestingTooDeep {
                        owner: rule.owner,
                        offset: cursor,
                        limit: MAX_DEPTH,
                    });
                }
                let (after, children) = self.decode_level(data, next, Some(rule.owner), depth + 1)?;
                debug!(owner = %rule.owner, count = children.len(), "closed child scope");
                owner.children = Some(children);
                previous = Some(tag);
                cursor = after;
                continue;
            }

            if let Some(rule) = self.closed_by(tag) {
                if parent != Some(rule.owner) {
                    return Err(Error::UnexpectedScopeClose {
                        tag,
                        parent,
                        expected: rule.owner,
                        offset: cursor,
                    });
                }
                return Ok((next, siblings));
            }

            let fields = self
                .schema(tag)
                .ok_or(Error::UnknownSection { tag, offset: cursor })?;
            let (mut attributes, end) = inline::decode_record(fields, &data[..next], cursor)?;
            if end > next {
                return Err(Error::InvalidChunkSize {
                    tag,
                    offset: cursor,
                    size,
                });
            }
            attributes.remove(TAG_KEY);
            attributes.remove(SIZE_KEY);

            siblings.push(Section {
                tag,
                attributes,
                trailing: data[end..next].to_vec(),
                children: None,
            });
            previous = Some(tag);
            cursor = next;
        }

        match parent {
            Some(owner) => Err(Error::UnterminatedScope { owner }),
            None => Ok((cursor, siblings)),
        }
    }

    /// Encode a section tree back into a chunk stream.
    ///
    /// Returns the bytes and the number of chunks written, scope markers
    /// included.
    pub fn encode(&self, sections: &[Section]) -> Result<(Vec<u8>, usize)> {
        let mut out = Vec::new();
        let mut count = 0;
        self.encode_level(sections, &mut out, &mut count, 0)?;
        debug!(chunks = count, bytes = out.len(), "encoded sections");
        Ok((out, count))
    }

    fn encode_level(&self, sections: &[Section], out: &mut Vec<u8>, count: &mut usize, depth: usize) -> Result<()> {
        for section in sections {
            let tag = section.tag;
            let fields = match self.schema(tag) {
                Some(fields) if self.opened_by(tag).is_none() && self.closed_by(tag).is_none() => fields,
                Some(_) => return Err(Error::MisplacedSection(tag)),
                None => return Err(Error::UnknownSection { tag, offset: out.len() }),
            };

            let mut record = section.attributes.clone();
            record.insert(TAG_KEY, tag.as_str());
            record.insert(SIZE_KEY, 0u64);

            let mut chunk = inline::encode_record(fields, &record)?;
            chunk.extend_from_slice(&section.trailing);
            let size = u32::try_from(chunk.len()).map_err(|_| Error::InvalidChunkSize {
                tag,
                offset: out.len(),
                size: chunk.len(),
            })?;
            BigEndian::write_u32(&mut chunk[4..8], size);
            out.extend_from_slice(&chunk);
            *count += 1;

            if let Some(children) = &section.children {
                let rule = *self.owned_by(tag).ok_or(Error::MisplacedSection(tag))?;
                if depth >= MAX_DEPTH {
                    return Err(Error::NestingTooDeep {
                        owner: tag,
                        offset: out.len(),
                        limit: MAX_DEPTH,
                    });
                }
                out.extend_from_slice(ChunkHeader::new(rule.open, ChunkHeader::SIZE as u32).as_bytes());
                self.encode_level(children, out, count, depth + 1)?;
                out.extend_from_slice(ChunkHeader::new(rule.close, ChunkHeader::SIZE as u32).as_bytes());
                *count += 2;
            }
        }
        Ok(())
    }
}
