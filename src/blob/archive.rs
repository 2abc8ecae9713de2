//! The archive (filing) categories BLOB.
//!
//! Two generations of entries are found in deployed databases. Older entries
//! end after a list of opaque remainder fields, and if they have a key code the
//! last remainder field holds the category ID. Newer entries append a trailing
//! block with an explicit category ID, which takes precedence. Both are read by
//! the same routine, and the tail is told apart by whether the entry ends after
//! the remainder fields.

use super::{reader::uint_le, Error, FieldReader, Result};
use crate::category::{CategoryId, KeyCode};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Width of a field holding a double.
const DOUBLE_LEN: usize = 8;

/// Scan settings stored with newer archive categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScanMetadata {
    pub quality: Option<u64>,
    pub dpi: Option<u64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Where the category ID of an entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ArchiveTail {
    /// Older entry ending after the remainder fields.
    Remainder { tentative_id: Option<CategoryId> },
    /// Newer entry with an explicit trailing ID. The remainder ID is kept only
    /// to report disagreements.
    Trailing {
        id: CategoryId,
        tentative_id: Option<CategoryId>,
    },
}

impl ArchiveTail {
    /// The trailing ID if present, else the remainder ID.
    pub fn category_id(&self) -> Option<CategoryId> {
        match *self {
            ArchiveTail::Remainder { tentative_id } => tentative_id,
            ArchiveTail::Trailing { id, .. } => Some(id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    /// Absent when the key-code field is empty.
    pub key_code: Option<KeyCode>,
    pub scan: ScanMetadata,
    pub tail: ArchiveTail,
}

impl ArchiveEntry {
    pub fn category_id(&self) -> Option<CategoryId> {
        self.tail.category_id()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArchiveBlock {
    pub total_length: u16,
    pub declared_count: u16,
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveBlock {
    #[tracing::instrument(skip(buf), fields(len = buf.len()))]
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut reader = FieldReader::new(buf);
        let total_length = reader.u16()?;
        reader.skip(2)?;
        let declared_count = reader.u16()?;

        let mut entries = vec![];
        while !reader.is_exhausted() {
            let entry = decode_entry(reader.field()?)?;
            debug!(name = %entry.name, id = ?entry.category_id(), "archive category");
            entries.push(entry);
        }
        if (entries.len() as u64) < u64::from(declared_count) {
            // at least the length of the next entry is missing
            return Err(Error::UnexpectedEndOfBuffer {
                offset: reader.position(),
                needed: 2,
                remaining: 0,
            });
        }

        Ok(ArchiveBlock {
            total_length,
            declared_count,
            entries,
        })
    }

    /// Entries that resolved to a category ID. Later entries win on conflicts.
    pub fn by_category(&self) -> BTreeMap<CategoryId, &ArchiveEntry> {
        self.entries
            .iter()
            .filter_map(|entry| entry.category_id().map(|id| (id, entry)))
            .collect()
    }
}

fn decode_entry(entry: &[u8]) -> Result<ArchiveEntry> {
    let mut reader = FieldReader::new(entry);
    reader.skip_field()?;
    let name = reader.text()?;
    let key_len = reader.u16()? as usize;
    let key_code = if key_len > 0 {
        let key_code = reader.text_of_len(key_len)?;
        Some(KeyCode::padded(key_code, KeyCode::ARCHIVE_FILLER))
    } else {
        None
    };

    // options, not understood
    reader.skip_field()?;
    let scan = ScanMetadata {
        quality: optional_uint(&mut reader)?,
        dpi: optional_uint(&mut reader)?,
        width: optional_f64(&mut reader)?,
        height: optional_f64(&mut reader)?,
    };

    let remainder_count = reader.u16()?;
    let mut last_remainder: Option<(usize, &[u8])> = None;
    for _ in 0..remainder_count {
        let offset = reader.position() + 2;
        last_remainder = Some((offset, reader.field()?));
    }
    let tentative_id = match (&key_code, last_remainder) {
        (Some(_), Some((offset, bytes))) if !bytes.is_empty() => {
            if bytes.len() > 8 {
                return Err(Error::IntegerTooWide {
                    offset,
                    width: bytes.len(),
                });
            }
            Some(uint_le(bytes))
        }
        _ => None,
    };

    let tail = if reader.is_exhausted() {
        ArchiveTail::Remainder { tentative_id }
    } else {
        reader.skip_field()?;
        reader.skip_field()?;
        let id = reader.var_uint()?;
        if let Some(tentative) = tentative_id.filter(|&tentative| tentative != id) {
            warn!(
                name = %name,
                trailing = id,
                remainder = tentative,
                "trailing category ID differs from remainder ID, using trailing"
            );
        }
        ArchiveTail::Trailing { id, tentative_id }
    };

    Ok(ArchiveEntry {
        name,
        key_code,
        scan,
        tail,
    })
}

/// An integer field that is absent when empty.
fn optional_uint(reader: &mut FieldReader) -> Result<Option<u64>> {
    if reader.peek(2)? == [0x00, 0x00] {
        reader.skip(2)?;
        return Ok(None);
    }
    reader.var_uint().map(Some)
}

/// A double field that is absent when empty. Other lengths are not understood
/// and skipped.
fn optional_f64(reader: &mut FieldReader) -> Result<Option<f64>> {
    let offset = reader.position();
    let content = reader.field()?;
    match content.len() {
        0 => Ok(None),
        DOUBLE_LEN => FieldReader::new(content).f64().map(Some),
        len => {
            debug!(offset, len, "skipping dimension field of unexpected length");
            Ok(None)
        }
    }
}
