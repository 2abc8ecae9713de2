use super::{Error, FieldReader, Result};
use crate::category::{CategoryId, KeyCode};
use serde::Serialize;
use tracing::debug;

/// Unknown bytes between the empty key-code field and the real key code in
/// entries that carry their own category ID.
const ALTERNATE_SHAPE_GAP: usize = 4;

/// A category for letters, either bound to a category ID or to be matched by
/// key code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LetterEntry {
    pub name: String,
    pub key_code: KeyCode,
    pub category_id: Option<CategoryId>,
}

/// The letter categories BLOB.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LetterBlock {
    pub total_length: u16,
    pub declared_count: u64,
    /// Entries in BLOB order.
    pub entries: Vec<LetterEntry>,
}

impl LetterBlock {
    #[tracing::instrument(skip(buf), fields(len = buf.len()))]
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut reader = FieldReader::new(buf);
        let total_length = reader.u16()?;
        let declared_count = reader.var_uint()?;

        let mut entries = vec![];
        while !reader.is_exhausted() {
            let entry = decode_entry(reader.field()?)?;
            debug!(
                name = %entry.name,
                key = %entry.key_code,
                id = ?entry.category_id,
                "letter category"
            );
            entries.push(entry);
        }
        if (entries.len() as u64) < declared_count {
            // at least the length of the next entry is missing
            return Err(Error::UnexpectedEndOfBuffer {
                offset: reader.position(),
                needed: 2,
                remaining: 0,
            });
        }

        Ok(LetterBlock {
            total_length,
            declared_count,
            entries,
        })
    }
}

fn decode_entry(entry: &[u8]) -> Result<LetterEntry> {
    let mut reader = FieldReader::new(entry);
    reader.skip_field()?;
    let name = reader.text()?;
    let key_len = reader.u16()? as usize;
    let (key_code, category_id) = if key_len == 0 {
        reader.skip(ALTERNATE_SHAPE_GAP)?;
        let key_code = reader.text()?;
        let category_id = reader.var_uint()?;
        (key_code, Some(category_id))
    } else {
        (reader.text_of_len(key_len)?, None)
    };

    Ok(LetterEntry {
        name,
        key_code: KeyCode::padded(key_code, KeyCode::LETTER_FILLER),
        category_id,
    })
}

#[cfg(test)]
pub mod fixture {
    use crate::blob::fixture::Builder;

    /// An entry with a key code only.
    pub fn keyed(name: &str, key_code: &str) -> Vec<u8> {
        Builder::new()
            .field(&[0x10, 0x00])
            .text(name)
            .text(key_code)
            .build()
    }

    /// An entry with its own category ID.
    pub fn with_id(name: &str, key_code: &str, id: u64, id_width: usize) -> Vec<u8> {
        Builder::new()
            .field(&[0x10, 0x00])
            .text(name)
            .u16(0)
            .buf(&[0x01, 0x02, 0x03, 0x04])
            .text(key_code)
            .var_uint(id, id_width)
            .build()
    }

    pub fn block(entries: &[Vec<u8>]) -> Vec<u8> {
        let mut builder = Builder::new();
        builder.u16(0).var_uint(entries.len() as u64, 1);
        for entry in entries {
            builder.field(entry);
        }
        builder.build()
    }
}

#[cfg(test)]
mod test {
    use super::fixture::{block, keyed, with_id};
    use super::*;

    fn sample() -> Vec<u8> {
        block(&[
            with_id("Letter Five", "LF", 5, 2),
            keyed("Arztbrief", "abc"),
            keyed("Kurz", "K"),
            with_id("Überweisung", "", 300, 2),
        ])
    }

    #[test]
    fn decodes_both_shapes() {
        let letters = LetterBlock::decode(&sample()).unwrap();
        assert_eq!(letters.declared_count, 4);
        assert_eq!(
            letters.entries,
            vec![
                LetterEntry {
                    name: "Letter Five".into(),
                    key_code: KeyCode::padded("LF".into(), 'q'),
                    category_id: Some(5),
                },
                LetterEntry {
                    name: "Arztbrief".into(),
                    key_code: KeyCode::padded("abc".into(), 'q'),
                    category_id: None,
                },
                LetterEntry {
                    name: "Kurz".into(),
                    key_code: KeyCode::padded("K".into(), 'q'),
                    category_id: None,
                },
                LetterEntry {
                    name: "Überweisung".into(),
                    key_code: KeyCode::padded("".into(), 'q'),
                    category_id: Some(300),
                },
            ]
        );
    }

    #[test]
    fn short_key_codes_get_q_filler() {
        let letters = LetterBlock::decode(&sample()).unwrap();
        assert_eq!(letters.entries[2].key_code.as_str(), "qK");
        assert_eq!(letters.entries[3].key_code.as_str(), "q");
    }

    #[test]
    fn every_truncation_fails() {
        let buf = sample();
        for len in 0..buf.len() {
            let err = LetterBlock::decode(&buf[..len]).unwrap_err();
            assert!(
                err.is_unexpected_end(),
                "Truncation at {} gave {:?}",
                len,
                err
            );
        }
    }

    #[test]
    fn fewer_entries_than_declared_fails() {
        let mut buf = block(&[keyed("A", "AA"), keyed("B", "BB")]);
        let second_len = keyed("B", "BB").len() + 2;
        buf.truncate(buf.len() - second_len);
        assert_eq!(
            LetterBlock::decode(&buf).unwrap_err(),
            Error::UnexpectedEndOfBuffer {
                offset: buf.len(),
                needed: 2,
                remaining: 0
            }
        );
    }

    #[test]
    fn truncation_inside_entry_fails() {
        let buf = sample();
        let err = LetterBlock::decode(&buf[..buf.len() - 1]).unwrap_err();
        assert!(err.is_unexpected_end());
    }

    #[test]
    fn empty_block() {
        let letters = LetterBlock::decode(&block(&[])).unwrap();
        assert!(letters.entries.is_empty());
    }

    #[test]
    fn missing_header_fails() {
        assert!(LetterBlock::decode(&[]).unwrap_err().is_unexpected_end());
    }
}
