//! Format detection and dispatch.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;
use wuj_bmg::MessageCatalog;
use wuj_brctr::Control;
use wuj_brlyt::Layout;
use wuj_schema::Record;

use crate::{Error, Result};

/// A supported binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `RLYT` layout.
    Layout,
    /// `bctr` control file.
    Control,
    /// `MESGbmg1` message catalog.
    Messages,
}

impl Format {
    /// Every supported format.
    pub const ALL: [Format; 3] = [Format::Layout, Format::Control, Format::Messages];

    /// Leading magic bytes of the format.
    pub const fn magic(self) -> &'static [u8] {
        match self {
            Self::Layout => wuj_brlyt::MAGIC,
            Self::Control => wuj_brctr::MAGIC,
            Self::Messages => wuj_bmg::MAGIC,
        }
    }

    /// File extension of the format, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Layout => "brlyt",
            Self::Control => "brctr",
            Self::Messages => "bmg",
        }
    }

    /// Select a format by the leading magic of `data`.
    pub fn detect(data: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|f| data.starts_with(f.magic()))
    }

    /// Like [`Format::detect`], but reports the unrecognized magic.
    pub fn detect_or_err(data: &[u8]) -> Result<Self> {
        Self::detect(data).ok_or_else(|| {
            let magic = &data[..data.len().min(4)];
            Error::UnknownMagic(magic.escape_ascii().to_string())
        })
    }

    /// Select a format by file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(extension))
    }

    /// Select a format by the inner extension of a textual file name, so
    /// `menu.brlyt.json` selects [`Format::Layout`].
    pub fn from_text_path(path: &Path) -> Option<Self> {
        let inner = Path::new(path.file_stem()?);
        Self::from_extension(inner.extension()?.to_str()?)
    }

    /// Decode binary data to its textual record.
    pub fn decode(self, data: &[u8]) -> Result<Record> {
        debug!(format = %self, bytes = data.len(), "decoding");
        let record = match self {
            Self::Layout => Layout::parse(data)?.to_record(),
            Self::Control => Control::parse(data)?.to_record(),
            Self::Messages => MessageCatalog::parse(data)?.to_record(),
        };
        Ok(record)
    }

    /// Encode a textual record to binary data.
    pub fn encode(self, record: &Record) -> Result<Vec<u8>> {
        debug!(format = %self, "encoding");
        let bytes = match self {
            Self::Layout => Layout::from_record(record)?.to_bytes()?,
            Self::Control => Control::from_record(record)?.to_bytes()?,
            Self::Messages => MessageCatalog::from_record(record)?.to_bytes()?,
        };
        Ok(bytes)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim_start_matches('.')).ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_magic() {
        assert_eq!(Format::detect(b"RLYT\xFE\xFF"), Some(Format::Layout));
        assert_eq!(Format::detect(b"bctr\x00\x02"), Some(Format::Control));
        assert_eq!(Format::detect(b"MESGbmg1...."), Some(Format::Messages));
        assert_eq!(Format::detect(b"MESG"), None);
        assert_eq!(Format::detect(b""), None);

        let err = Format::detect_or_err(b"RARC\0\0").unwrap_err();
        assert_eq!(err.to_string(), "unrecognized file magic \"RARC\"");
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Format::from_extension("BRLYT"), Some(Format::Layout));
        assert_eq!(".bmg".parse::<Format>().unwrap(), Format::Messages);
        assert!(matches!("brlan".parse::<Format>(), Err(Error::UnknownFormat(_))));

        assert_eq!(Format::from_text_path(Path::new("ui/menu.brctr.json")), Some(Format::Control));
        assert_eq!(Format::from_text_path(Path::new("menu.json")), None);
    }

    #[test]
    fn test_dispatch_roundtrip() {
        let record = Record::new().with("version", 2u64).with("main brlyt", "menu");
        let bytes = Format::Control.encode(&record).unwrap();
        assert_eq!(Format::detect(&bytes), Some(Format::Control));

        let decoded = Format::Control.decode(&bytes).unwrap();
        assert_eq!(Format::Control.encode(&decoded).unwrap(), bytes);

        let layout = Format::Layout.encode(&Record::new()).unwrap();
        assert_eq!(Format::Layout.decode(&layout).unwrap().get("version").and_then(|v| v.as_u64()), Some(10));
    }

    #[test]
    fn test_errors_are_wrapped() {
        assert!(matches!(Format::Messages.decode(b"MESGbmg1"), Err(Error::Messages(_))));
        assert!(matches!(Format::Layout.decode(b"bctr"), Err(Error::Layout(_))));
    }
}
