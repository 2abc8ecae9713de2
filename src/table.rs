use crate::args::Table;
use archivblob::cache::CategoryCache;
use archivblob::config::{Config, ConfigError};
use archivblob::dump::DiagnosticDump;
use archivblob::reconcile::FinalCategory;
use archivblob::reload::{Blobs, ReloadError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub fn table(opts: &Table) -> Result<(), TableError> {
    let config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let memo_path = opts
        .memo
        .as_ref()
        .or_else(|| config.memo.as_ref())
        .ok_or(TableError::NoMemo)?;
    let memo = read(memo_path)?;
    let letters = read_optional(opts.letters.as_ref().or_else(|| config.letters.as_ref()))?;
    let archive = read_optional(opts.archive.as_ref().or_else(|| config.archive.as_ref()))?;
    let legacy = read_optional(opts.legacy.as_ref().or_else(|| config.legacy.as_ref()))?;
    let dump = match &opts.dump {
        Some(path) => DiagnosticDump::new(path),
        None => config.dump(),
    };

    let blobs = Blobs {
        memo: &memo,
        letters: letters.as_deref(),
        archive: archive.as_deref(),
        legacy: legacy.as_deref(),
    };
    let cache = CategoryCache::new();
    let diagnostics = cache.reload(&blobs, &dump)?;
    for diagnostic in &diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    let table = cache.snapshot();
    let rows: Vec<&FinalCategory> = match &opts.preset {
        Some(name) => config
            .presets()
            .find(name)
            .ok_or_else(|| TableError::UnknownPreset(name.clone()))?
            .filter(&table),
        None => table.rows().iter().collect(),
    };
    debug!(shown = rows.len(), total = table.row_count(), "printing categories");
    for category in rows {
        let color = category
            .color
            .map(|color| color.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6}  {:<8}  {:<7}  {}",
            category.id, category.short_label, color, category.name
        );
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>, TableError> {
    fs::read(path).map_err(|source| TableError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional(path: Option<&PathBuf>) -> Result<Option<Vec<u8>>, TableError> {
    path.map(|path| read(path)).transpose()
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("No memo BLOB given, neither on the command line nor in the configuration")]
    NoMemo,
    #[error("Could not read BLOB from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Reload(#[from] ReloadError),
    #[error("No preset named {0}")]
    UnknownPreset(String),
}
