//! Message text codec.
//!
//! Messages are UTF-16BE and terminated by a zero code unit. Code unit
//! `0x001A` starts an escape sequence: a length byte counting the whole
//! escape (the `0x001A` unit included), then the payload. In text form an
//! escape is written as `{` + hex of the bytes after `0x001A` + `}`, and
//! literal braces are doubled.

use wuj_common::BinaryReader;

use crate::{Error, Result};

/// Code unit that starts an escape sequence.
pub const ESCAPE: u16 = 0x001A;

/// Bytes of an escape that precede its payload.
const ESCAPE_HEADER: usize = 3;

/// Decode the message starting at `offset` in a text pool.
pub fn decode_text(pool: &[u8], offset: usize) -> Result<String> {
    if offset >= pool.len() {
        return Err(Error::TextOffset(offset));
    }

    let mut reader = BinaryReader::new_at(pool, offset);
    let mut text = String::new();
    let mut units = Vec::new();

    loop {
        match reader.read_u16()? {
            0 => break,
            ESCAPE => {
                flush(&mut units, &mut text, offset)?;
                let len = reader.read_u8()?;
                let payload = usize::from(len)
                    .checked_sub(ESCAPE_HEADER)
                    .ok_or_else(|| Error::InvalidEscape(format!("length {len} at {:#x}", reader.position() - 1)))?;
                let payload = reader.read_bytes(payload)?;

                text.push('{');
                text.push_str(&hex::encode([len]));
                text.push_str(&hex::encode(payload));
                text.push('}');
            }
            unit => units.push(unit),
        }
    }
    flush(&mut units, &mut text, offset)?;

    Ok(text)
}

/// Append pending code units to `text`, doubling literal braces.
fn flush(units: &mut Vec<u16>, text: &mut String, offset: usize) -> Result<()> {
    if units.is_empty() {
        return Ok(());
    }
    let plain = String::from_utf16(units).map_err(|_| Error::InvalidText { offset })?;
    for c in plain.chars() {
        if c == '{' || c == '}' {
            text.push(c);
        }
        text.push(c);
    }
    units.clear();
    Ok(())
}

/// Encode a message to UTF-16BE without its terminator.
pub fn encode_text(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 2);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                push_char(&mut out, '{');
            }
            '{' => {
                let mut escape = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => escape.push(c),
                        None => return Err(Error::InvalidEscape(format!("unterminated '{{{escape}'"))),
                    }
                }
                out.extend_from_slice(&ESCAPE.to_be_bytes());
                out.extend_from_slice(&escape_bytes(&escape)?);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                push_char(&mut out, '}');
            }
            '}' => return Err(Error::InvalidEscape("unmatched '}'".to_string())),
            '\0' => {
                return Err(wuj_schema::Error::InvalidString {
                    field: "text".to_string(),
                    value: text.to_string(),
                }
                .into())
            }
            c => push_char(&mut out, c),
        }
    }

    Ok(out)
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u16; 2];
    for unit in c.encode_utf16(&mut buf) {
        out.extend_from_slice(&unit.to_be_bytes());
    }
}

/// Parse the hex body of an escape and check its length byte.
fn escape_bytes(escape: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(escape).map_err(|e| Error::InvalidEscape(format!("{{{escape}}}: {e}")))?;
    match bytes.first() {
        Some(&len) if usize::from(len) == bytes.len() + ESCAPE_HEADER - 1 => Ok(bytes),
        _ => Err(Error::InvalidEscape(format!(
            "{{{escape}}}: length byte must equal the escape size in bytes"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }

    #[test]
    fn test_plain_text() {
        let mut pool = vec![0, 0];
        pool.extend(utf16("Hello"));
        pool.extend([0, 0]);

        assert_eq!(decode_text(&pool, 0).unwrap(), "");
        assert_eq!(decode_text(&pool, 2).unwrap(), "Hello");
        assert_eq!(encode_text("Hello").unwrap(), utf16("Hello"));
    }

    #[test]
    fn test_escape_sequence() {
        let mut pool = utf16("Hi ");
        pool.extend([0x00, 0x1A, 0x06, 0x00, 0x00, 0x01]);
        pool.extend(utf16("!"));
        pool.extend([0, 0]);

        let text = decode_text(&pool, 0).unwrap();
        assert_eq!(text, "Hi {06000001}!");
        assert_eq!(encode_text(&text).unwrap(), pool[..pool.len() - 2]);
    }

    #[test]
    fn test_escape_may_contain_zero_units() {
        let mut pool = vec![0x00, 0x1A, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
        pool.extend(utf16("x"));
        pool.extend([0, 0]);
        assert_eq!(decode_text(&pool, 0).unwrap(), "{080000000000}x");
    }

    #[test]
    fn test_literal_braces() {
        let encoded = utf16("a{b}c");
        let mut pool = encoded.clone();
        pool.extend([0, 0]);

        assert_eq!(decode_text(&pool, 0).unwrap(), "a{{b}}c");
        assert_eq!(encode_text("a{{b}}c").unwrap(), encoded);
    }

    #[test]
    fn test_surrogate_pairs() {
        let encoded = encode_text("ok \u{1F600}").unwrap();
        let mut pool = encoded.clone();
        pool.extend([0, 0]);
        assert_eq!(decode_text(&pool, 0).unwrap(), "ok \u{1F600}");
        assert_eq!(encoded.len(), 10);
    }

    #[test]
    fn test_malformed_escapes() {
        assert!(matches!(encode_text("{zz}"), Err(Error::InvalidEscape(_))));
        assert!(matches!(encode_text("{0500}"), Err(Error::InvalidEscape(_))));
        assert!(matches!(encode_text("}"), Err(Error::InvalidEscape(_))));
        assert!(matches!(encode_text("{}"), Err(Error::InvalidEscape(_))));
        assert!(matches!(encode_text("{06000001"), Err(Error::InvalidEscape(_))));
        assert!(encode_text("nul\0").is_err());

        let pool = [0x00, 0x1A, 0x02, 0x00, 0x00];
        assert!(matches!(decode_text(&pool, 0), Err(Error::InvalidEscape(_))));
    }

    #[test]
    fn test_bad_offsets() {
        assert!(matches!(decode_text(&[0, 0], 2), Err(Error::TextOffset(2))));
        assert!(decode_text(&[0, 0x41], 0).is_err());
        assert!(matches!(decode_text(&[0xD8, 0x00, 0, 0], 0), Err(Error::InvalidText { .. })));
    }
}
