//! The category list of older database versions.
//!
//! Entries are not length-prefixed here, they follow each other directly after
//! a fixed header. The record layout is the one of the memo block, with a two
//! byte ID of fixed width and a few more unknown fields.

use super::{extended, ColorBlock, FieldReader, Result};
use crate::category::{CategoryId, CategoryRecord, KeyCode, RecordShape};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Header bytes before the first entry. Not self-describing, the value was
/// found empirically.
pub const HEADER_LEN: usize = 48;

pub type LegacyEntry = CategoryRecord;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegacyBlock {
    /// Entries in BLOB order, without unused slots.
    pub entries: Vec<LegacyEntry>,
}

impl LegacyBlock {
    #[tracing::instrument(skip(buf), fields(len = buf.len()))]
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut reader = FieldReader::new(buf);
        reader.skip(HEADER_LEN)?;

        let mut entries = vec![];
        while !reader.is_exhausted() {
            let entry = decode_entry(&mut reader)?;
            if entry.id == 0 {
                debug!(key = %entry.display_key, "skipping unused slot");
                continue;
            }
            debug!(id = entry.id, name = entry.name(), "legacy category");
            entries.push(entry);
        }
        Ok(LegacyBlock { entries })
    }

    /// Names by category ID, stubs named by their display key.
    pub fn names(&self) -> BTreeMap<CategoryId, &str> {
        self.entries
            .iter()
            .map(|entry| (entry.id, entry.name()))
            .collect()
    }
}

fn decode_entry(reader: &mut FieldReader) -> Result<LegacyEntry> {
    let id = CategoryId::from(reader.u16()?);
    let display_key = reader.text()?;
    let (shape, color) = extended::shape(reader, KeyCode::LEGACY_FILLER)?;
    if let RecordShape::Extended(_) = shape {
        match color {
            // an unknown two bytes follow unless the color field was unusual
            ColorBlock::Rgb(_) | ColorBlock::Unmarked => reader.skip(2)?,
            ColorBlock::Unrecognized => {}
        }
    }
    reader.skip_field()?;
    reader.skip(2)?;
    Ok(CategoryRecord {
        id,
        display_key,
        shape,
    })
}
