//! Shared access to the current category table.
//!
//! Readers take a snapshot and keep using it for as long as they like, a
//! reload never changes a table that was handed out. Lookups are answered
//! from one snapshot each, so a row count and the rows it counts always
//! belong to the same table.

use crate::category::{CategoryId, Rgb};
use crate::dump::DiagnosticDump;
use crate::reconcile::{CategoryTable, Diagnostic};
use crate::reload::{self, Blobs, ReloadError};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct CategoryCache {
    current: ArcSwap<CategoryTable>,
}

impl Default for CategoryCache {
    fn default() -> Self {
        CategoryCache {
            current: ArcSwap::from_pointee(CategoryTable::default()),
        }
    }
}

impl CategoryCache {
    /// A cache holding an empty table.
    pub fn new() -> Self {
        CategoryCache::default()
    }

    pub fn snapshot(&self) -> Arc<CategoryTable> {
        self.current.load_full()
    }

    /// Swaps in a new table. Snapshots taken earlier are unaffected.
    pub fn replace(&self, table: CategoryTable) {
        self.current.store(Arc::new(table));
    }

    /// Rebuilds the table from the BLOBs. On failure the previous table stays
    /// in place.
    pub fn reload(
        &self,
        blobs: &Blobs,
        dump: &DiagnosticDump,
    ) -> Result<Vec<Diagnostic>, ReloadError> {
        let reconciliation = reload::reload(blobs, dump)?;
        info!(
            categories = reconciliation.table.row_count(),
            diagnostics = reconciliation.diagnostics.len(),
            "category table reloaded"
        );
        self.replace(reconciliation.table);
        Ok(reconciliation.diagnostics)
    }

    pub fn row_count(&self) -> usize {
        self.snapshot().row_count()
    }

    pub fn name_by_id(&self, id: CategoryId) -> Option<String> {
        self.snapshot().name_at(id).map(str::to_string)
    }

    pub fn color_by_id(&self, id: CategoryId) -> Option<Rgb> {
        self.snapshot().color_at(id)
    }

    pub fn id_at_row(&self, row: usize) -> Option<CategoryId> {
        self.snapshot().id_at_row(row)
    }
}
