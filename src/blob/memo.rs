use super::{extended, FieldReader, Result};
use crate::category::{CategoryId, CategoryRecord, KeyCode};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Number of opaque length-prefixed fields between the total length and the
/// categories section.
const HEADER_FIELDS: usize = 5;

/// The memo BLOB, the authoritative source of categories.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemoBlock {
    /// Length as stated in the BLOB, not used for bounds checking.
    pub total_length: u16,
    /// Category count as stated in the BLOB. Entries have variable length, so
    /// the loop is bounded by the section length instead.
    pub declared_count: u64,
    /// Categories in use, by ID.
    pub categories: BTreeMap<CategoryId, CategoryRecord>,
    /// IDs of entries marked as not in use and therefore left out of
    /// `categories`.
    pub unused: BTreeSet<CategoryId>,
}

impl MemoBlock {
    #[tracing::instrument(skip(buf), fields(len = buf.len()))]
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut reader = FieldReader::new(buf);
        let total_length = reader.u16()?;
        for _ in 0..HEADER_FIELDS {
            reader.skip_field()?;
        }

        let section_len = reader.u16()? as usize;
        reader.ensure(section_len)?;
        let section_end = reader.position() + section_len;
        let declared_count = reader.var_uint()?;
        debug!(total_length, declared_count, section_end, "memo header");

        let mut categories = BTreeMap::new();
        let mut unused = BTreeSet::new();
        while reader.position() < section_end {
            let entry = reader.field()?;
            let record = decode_entry(entry)?;
            let id = record.id;
            let duplicate = if record.use_category() {
                debug!(id, key = %record.display_key, name = record.name(), "category");
                unused.remove(&id) | categories.insert(id, record).is_some()
            } else {
                debug!(id, key = %record.display_key, "category not in use");
                categories.remove(&id).is_some() | !unused.insert(id)
            };
            if duplicate {
                warn!(id, "duplicate category ID, keeping the later entry");
            }
        }

        Ok(MemoBlock {
            total_length,
            declared_count,
            categories,
            unused,
        })
    }

    pub fn get(&self, id: CategoryId) -> Option<&CategoryRecord> {
        self.categories.get(&id)
    }

    /// First category in ID order whose display key matches the key code.
    pub fn find_by_key(&self, key_code: &KeyCode) -> Option<&CategoryRecord> {
        self.categories
            .values()
            .find(|record| key_code.matches(&record.display_key))
    }
}

fn decode_entry(entry: &[u8]) -> Result<CategoryRecord> {
    let mut reader = FieldReader::new(entry);
    reader.skip_field()?;
    let id = reader.var_uint()?;
    let display_key = reader.text()?;
    let (shape, _) = extended::shape(&mut reader, KeyCode::MEMO_FILLER)?;
    Ok(CategoryRecord {
        id,
        display_key,
        shape,
    })
}
