//! Merges the memo categories with the short names of the other blocks into
//! the table shown to users.
//!
//! The memo block is authoritative for which categories exist and for their
//! colors. Letter, archive and legacy entries only rename categories, either
//! by explicit ID or by matching their key code against memo display keys.

use crate::blob::{ArchiveEntry, BlockKind, LegacyEntry, LetterEntry, MemoBlock};
use crate::category::{CategoryId, KeyCode, Rgb};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

/// A name from one of the supplementary blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Supplement {
    pub block: BlockKind,
    pub name: String,
    pub key_code: Option<KeyCode>,
    pub category_id: Option<CategoryId>,
}

impl From<&LetterEntry> for Supplement {
    fn from(entry: &LetterEntry) -> Self {
        Supplement {
            block: BlockKind::Letters,
            name: entry.name.clone(),
            key_code: Some(entry.key_code.clone()),
            category_id: entry.category_id,
        }
    }
}

impl From<&ArchiveEntry> for Supplement {
    fn from(entry: &ArchiveEntry) -> Self {
        Supplement {
            block: BlockKind::Archive,
            name: entry.name.clone(),
            key_code: entry.key_code.clone(),
            category_id: entry.category_id(),
        }
    }
}

impl From<&LegacyEntry> for Supplement {
    fn from(entry: &LegacyEntry) -> Self {
        Supplement {
            block: BlockKind::Legacy,
            name: entry.name().to_string(),
            key_code: entry.key_code().cloned(),
            category_id: Some(entry.id),
        }
    }
}

/// Problems that do not stop a reload but should be looked at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error("{block} entry \"{name}\" with key code {key_code:?} matches no category")]
    ReconciliationMismatch {
        block: BlockKind,
        name: String,
        key_code: Option<KeyCode>,
    },
    #[error("{block} entry \"{name}\" names category {id}, which is not in use")]
    CategoryNotInUse {
        block: BlockKind,
        name: String,
        id: CategoryId,
    },
    #[error("could not decode {block} block, ignoring its names: {error}")]
    SupplementUndecodable {
        block: BlockKind,
        error: crate::blob::Error,
    },
}

/// A consumer asked for a category that is not in the table, e.g. a document
/// of a deleted category.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no category with ID {0}")]
pub struct CategoryNotFound(pub CategoryId);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalCategory {
    pub id: CategoryId,
    pub name: String,
    pub short_label: String,
    pub color: Option<Rgb>,
}

/// Categories sorted by name, ready for display.
///
/// Tables are never patched. A reload builds a new one that replaces the old
/// as a whole.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategoryTable {
    rows: Vec<FinalCategory>,
    #[serde(skip)]
    index: HashMap<CategoryId, usize>,
}

impl CategoryTable {
    /// Sorts the categories by name. Equal names keep their given order.
    pub fn new(mut rows: Vec<FinalCategory>) -> Self {
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        let index = rows
            .iter()
            .enumerate()
            .map(|(row, category)| (category.id, row))
            .collect();
        CategoryTable { rows, index }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn id_at_row(&self, row: usize) -> Option<CategoryId> {
        self.rows.get(row).map(|category| category.id)
    }

    pub fn rows(&self) -> &[FinalCategory] {
        &self.rows
    }

    pub fn get(&self, id: CategoryId) -> Result<&FinalCategory, CategoryNotFound> {
        self.index
            .get(&id)
            .map(|&row| &self.rows[row])
            .ok_or(CategoryNotFound(id))
    }

    pub fn name_at(&self, id: CategoryId) -> Option<&str> {
        self.get(id).ok().map(|category| category.name.as_str())
    }

    pub fn color_at(&self, id: CategoryId) -> Option<Rgb> {
        self.get(id).ok().and_then(|category| category.color)
    }

    /// Label for exports, the raw ID for unknown categories.
    pub fn display_label_for(&self, id: CategoryId) -> Cow<'_, str> {
        match self.get(id) {
            Ok(category) => Cow::Borrowed(category.name.as_str()),
            Err(_) => Cow::Owned(id.to_string()),
        }
    }

    pub fn color_for(&self, id: CategoryId) -> Option<Rgb> {
        self.color_at(id)
    }
}

/// Result of merging, the table along with everything that did not fit.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    pub table: CategoryTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the final table from the memo categories and the supplementary
/// names, which are applied in order so that later names win.
#[tracing::instrument(skip(memo, supplements), fields(categories = memo.categories.len()))]
pub fn reconcile<I>(memo: &MemoBlock, supplements: I) -> Reconciliation
where
    I: IntoIterator<Item = Supplement>,
{
    let mut overrides: BTreeMap<CategoryId, String> = BTreeMap::new();
    let mut diagnostics = vec![];

    for supplement in supplements {
        let target = match (supplement.category_id, &supplement.key_code) {
            (Some(id), _) => Some(id),
            (None, Some(key_code)) => memo.find_by_key(key_code).map(|record| record.id),
            (None, None) => None,
        };
        match target {
            Some(id) if memo.unused.contains(&id) => {
                let diagnostic = Diagnostic::CategoryNotInUse {
                    block: supplement.block,
                    name: supplement.name,
                    id,
                };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
            Some(id) => {
                debug!(id, name = %supplement.name, block = %supplement.block, "name override");
                overrides.insert(id, supplement.name);
            }
            None => {
                let diagnostic = Diagnostic::ReconciliationMismatch {
                    block: supplement.block,
                    name: supplement.name,
                    key_code: supplement.key_code,
                };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
        }
    }

    let mut rows: Vec<FinalCategory> = memo
        .categories
        .values()
        .map(|record| FinalCategory {
            id: record.id,
            name: overrides
                .remove(&record.id)
                .unwrap_or_else(|| record.name().to_string()),
            short_label: record.display_key.clone(),
            color: record.color(),
        })
        .collect();
    // names for IDs without a memo record label themselves
    rows.extend(overrides.into_iter().map(|(id, name)| FinalCategory {
        id,
        short_label: name.clone(),
        name,
        color: None,
    }));
    rows.sort_by_key(|category| category.id);

    Reconciliation {
        table: CategoryTable::new(rows),
        diagnostics,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::category::{CategoryDetails, CategoryRecord, RecordShape, StatusFlags};
    use std::collections::BTreeSet;

    fn record(id: CategoryId, display_key: &str, full_name: &str) -> CategoryRecord {
        CategoryRecord {
            id,
            display_key: display_key.into(),
            shape: RecordShape::Extended(CategoryDetails {
                secondary_key: None,
                full_name: full_name.into(),
                key_code: KeyCode::padded(display_key.into(), KeyCode::MEMO_FILLER),
                color: None,
                flags: StatusFlags::default(),
            }),
        }
    }

    fn memo(records: Vec<CategoryRecord>) -> MemoBlock {
        MemoBlock {
            total_length: 0,
            declared_count: records.len() as u64,
            categories: records.into_iter().map(|r| (r.id, r)).collect(),
            unused: BTreeSet::new(),
        }
    }

    fn letter(name: &str, key_code: &str, category_id: Option<CategoryId>) -> Supplement {
        Supplement::from(&LetterEntry {
            name: name.into(),
            key_code: KeyCode::padded(key_code.into(), KeyCode::LETTER_FILLER),
            category_id,
        })
    }

    #[test]
    fn explicit_id_overrides_name_but_keeps_label() {
        let memo = memo(vec![record(5, "K5", "Memo Five")]);
        let result = reconcile(&memo, vec![letter("Letter Five", "LF", Some(5))]);
        let five = result.table.get(5).unwrap();
        assert_eq!(five.name, "Letter Five");
        assert_eq!(five.short_label, "K5");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn key_code_fallback_ignores_case() {
        let memo = memo(vec![record(6, "XYZ", "Other"), record(7, "ABC", "Memo Seven")]);
        let result = reconcile(&memo, vec![letter("Arztbrief", "abc", None)]);
        assert_eq!(result.table.name_at(7), Some("Arztbrief"));
        assert_eq!(result.table.name_at(6), Some("Other"));
    }

    #[test]
    fn key_code_fallback_takes_first_match() {
        let memo = memo(vec![record(2, "ab", "Two"), record(8, "AB", "Eight")]);
        let result = reconcile(&memo, vec![letter("Brief", "AB", None)]);
        assert_eq!(result.table.name_at(2), Some("Brief"));
        assert_eq!(result.table.name_at(8), Some("Eight"));
    }

    #[test]
    fn unmatched_entry_is_reported_not_fatal() {
        let memo = memo(vec![record(1, "A1", "One")]);
        let result = reconcile(&memo, vec![letter("Nirgends", "ZZ", None)]);
        assert_eq!(result.table.row_count(), 1);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::ReconciliationMismatch {
                block: BlockKind::Letters,
                name: "Nirgends".into(),
                key_code: Some(KeyCode::padded("ZZ".into(), 'q')),
            }]
        );
    }

    #[test]
    fn id_without_memo_record_labels_itself() {
        let memo = memo(vec![record(1, "A1", "One")]);
        let result = reconcile(&memo, vec![letter("Extern", "EX", Some(99))]);
        let extern_category = result.table.get(99).unwrap();
        assert_eq!(extern_category.name, "Extern");
        assert_eq!(extern_category.short_label, "Extern");
        assert_eq!(extern_category.color, None);
    }

    #[test]
    fn unused_category_stays_hidden() {
        let mut memo = memo(vec![record(5, "K5", "Memo Five")]);
        memo.unused.insert(6);
        let result = reconcile(
            &memo,
            vec![letter("Brief Sechs", "B6", Some(6)), letter("Brief Fünf", "B5", Some(5))],
        );
        let ids: Vec<_> = result.table.rows().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5]);
        assert_eq!(result.table.name_at(5), Some("Brief Fünf"));
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::CategoryNotInUse {
                block: BlockKind::Letters,
                name: "Brief Sechs".into(),
                id: 6,
            }]
        );
    }

    #[test]
    fn later_supplement_wins() {
        let memo = memo(vec![record(4, "K4", "Four")]);
        let archive = Supplement {
            block: BlockKind::Archive,
            name: "Ablage Vier".into(),
            key_code: None,
            category_id: Some(4),
        };
        let result = reconcile(&memo, vec![archive, letter("Brief Vier", "K4", None)]);
        assert_eq!(result.table.name_at(4), Some("Brief Vier"));
    }

    #[test]
    fn sorted_by_name_with_id_tiebreak() {
        let memo = memo(vec![
            record(9, "N9", "Same"),
            record(3, "N3", "Same"),
            record(1, "N1", "Zeta"),
            record(2, "N2", "Alpha"),
        ]);
        let table = reconcile(&memo, vec![]).table;
        let ids: Vec<_> = (0..table.row_count())
            .map(|row| table.id_at_row(row).unwrap())
            .collect();
        assert_eq!(ids, vec![2, 3, 9, 1]);
    }

    #[test]
    fn sort_is_ordinal_not_locale_aware() {
        let memo = memo(vec![
            record(1, "a", "apfel"),
            record(2, "b", "Birne"),
            record(3, "c", "Ähre"),
        ]);
        let table = reconcile(&memo, vec![]).table;
        let names: Vec<_> = table.rows().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Birne", "apfel", "Ähre"]);
    }

    #[test]
    fn unknown_category_lookup() {
        let table = reconcile(&memo(vec![record(1, "A1", "One")]), vec![]).table;
        assert_eq!(table.get(42).unwrap_err(), CategoryNotFound(42));
        assert_eq!(table.display_label_for(42), "42");
        assert_eq!(table.display_label_for(1), "One");
        assert_eq!(table.color_for(42), None);
        assert_eq!(table.id_at_row(1), None);
    }

    #[test]
    fn stub_records_use_display_key_as_name() {
        let stub = CategoryRecord {
            id: 11,
            display_key: "ST".into(),
            shape: RecordShape::Minimal,
        };
        let table = reconcile(&memo(vec![stub]), vec![]).table;
        assert_eq!(table.name_at(11), Some("ST"));
    }

    #[test]
    fn archive_entry_without_id_or_key_is_reported() {
        let memo = memo(vec![]);
        let archive = Supplement {
            block: BlockKind::Archive,
            name: "Lose".into(),
            key_code: None,
            category_id: None,
        };
        let result = reconcile(&memo, vec![archive]);
        assert!(result.table.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }
}
