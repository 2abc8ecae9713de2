use crate::args::Inspect;
use archivblob::blob::{self, ArchiveBlock, BlockKind, LegacyBlock, LetterBlock, MemoBlock};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub fn inspect(opts: &Inspect) -> Result<(), InspectError> {
    let buf = fs::read(&opts.file).map_err(|source| InspectError::Read {
        path: opts.file.clone(),
        source,
    })?;
    let decode_error = |source| InspectError::Decode {
        kind: opts.kind,
        path: opts.file.clone(),
        source,
    };
    let yaml = match opts.kind {
        BlockKind::Memo => serde_yaml::to_string(&MemoBlock::decode(&buf).map_err(decode_error)?),
        BlockKind::Letters => {
            serde_yaml::to_string(&LetterBlock::decode(&buf).map_err(decode_error)?)
        }
        BlockKind::Archive => {
            serde_yaml::to_string(&ArchiveBlock::decode(&buf).map_err(decode_error)?)
        }
        BlockKind::Legacy => {
            serde_yaml::to_string(&LegacyBlock::decode(&buf).map_err(decode_error)?)
        }
    }?;
    println!("{}", yaml);
    Ok(())
}

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Could not read BLOB from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not decode {path} as {kind} BLOB: {source}")]
    Decode {
        kind: BlockKind,
        path: PathBuf,
        source: blob::Error,
    },
    #[error("Could not print decoded BLOB: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
