//! Decoders for the category BLOBs of the practice management database.
//!
//! The format is undocumented. Everything here was reconstructed from observed
//! data: many fields are skipped only to keep the cursor aligned, and their
//! meaning is unknown. All blocks are built from the same primitive, a
//! length-prefixed field read through [FieldReader].

mod error;
pub(crate) mod extended;
mod reader;

#[cfg(test)]
pub mod fixture;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
pub use extended::ColorBlock;
pub use reader::FieldReader;

pub mod archive;
pub mod legacy;
pub mod letter;
pub mod memo;

pub use archive::{ArchiveBlock, ArchiveEntry};
pub use legacy::{LegacyBlock, LegacyEntry};
pub use letter::{LetterBlock, LetterEntry};
pub use memo::MemoBlock;

use serde::{Deserialize, Serialize};

/// The four BLOB columns that describe categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Memo,
    Letters,
    Archive,
    Legacy,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockKind::Memo => "memo",
            BlockKind::Letters => "letters",
            BlockKind::Archive => "archive",
            BlockKind::Legacy => "legacy",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for BlockKind {
    type Err = String;

    fn from_str(source: &str) -> std::result::Result<Self, Self::Err> {
        match source {
            "memo" => Ok(BlockKind::Memo),
            "letters" => Ok(BlockKind::Letters),
            "archive" => Ok(BlockKind::Archive),
            "legacy" => Ok(BlockKind::Legacy),
            other => Err(format!(
                "unknown block kind {}, expected one of memo, letters, archive, legacy",
                other
            )),
        }
    }
}
