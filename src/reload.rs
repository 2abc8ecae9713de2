//! Decodes the category BLOBs of one database row into a category table.

use crate::blob::{self, ArchiveBlock, BlockKind, LegacyBlock, LetterBlock, MemoBlock};
use crate::dump::DiagnosticDump;
use crate::reconcile::{reconcile, Diagnostic, Reconciliation, Supplement};
use thiserror::Error;
use tracing::{error, warn};

/// The raw category columns, as fetched from the database.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blobs<'a> {
    pub memo: &'a [u8],
    pub letters: Option<&'a [u8]>,
    pub archive: Option<&'a [u8]>,
    pub legacy: Option<&'a [u8]>,
}

#[derive(Debug, Error)]
pub enum ReloadError {
    /// Without the memo block there is no table at all. The raw BLOB is kept
    /// in the error for diagnosis.
    #[error("could not decode the memo categories ({len} bytes): {source}", len = .buffer.len())]
    Memo {
        source: blob::Error,
        buffer: Vec<u8>,
    },
}

/// Builds the category table. A memo block that cannot be decoded is fatal and
/// dumped for analysis, the other blocks only contribute names and their
/// failures are reported as diagnostics.
#[tracing::instrument(skip(blobs, dump), fields(memo_len = blobs.memo.len()))]
pub fn reload(blobs: &Blobs, dump: &DiagnosticDump) -> Result<Reconciliation, ReloadError> {
    let memo = MemoBlock::decode(blobs.memo).map_err(|source| {
        error!("memo BLOB undecodable: {}", source);
        dump.write(blobs.memo);
        ReloadError::Memo {
            source,
            buffer: blobs.memo.to_vec(),
        }
    })?;

    let mut supplements: Vec<Supplement> = vec![];
    let mut diagnostics = vec![];
    // order matters, letters are applied last and win
    if let Some(buf) = blobs.legacy {
        match LegacyBlock::decode(buf) {
            Ok(legacy) => supplements.extend(legacy.entries.iter().map(Supplement::from)),
            Err(error) => diagnostics.push(undecodable(BlockKind::Legacy, error)),
        }
    }
    if let Some(buf) = blobs.archive {
        match ArchiveBlock::decode(buf) {
            Ok(archive) => supplements.extend(archive.entries.iter().map(Supplement::from)),
            Err(error) => diagnostics.push(undecodable(BlockKind::Archive, error)),
        }
    }
    if let Some(buf) = blobs.letters {
        match LetterBlock::decode(buf) {
            Ok(letters) => supplements.extend(letters.entries.iter().map(Supplement::from)),
            Err(error) => diagnostics.push(undecodable(BlockKind::Letters, error)),
        }
    }

    let mut reconciliation = reconcile(&memo, supplements);
    diagnostics.append(&mut reconciliation.diagnostics);
    reconciliation.diagnostics = diagnostics;
    Ok(reconciliation)
}

fn undecodable(block: BlockKind, error: blob::Error) -> Diagnostic {
    let diagnostic = Diagnostic::SupplementUndecodable { block, error };
    warn!("{}", diagnostic);
    diagnostic
}
