//! Keeps memo BLOBs that failed to decode, so that new variants of the format
//! can be analysed offline.

use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DUMP_FILE_NAME: &str = "memo-blob.bin";

lazy_static! {
    /// Next to the running executable, or the working directory if the
    /// executable cannot be located.
    static ref DEFAULT_PATH: PathBuf = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DUMP_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(DUMP_FILE_NAME));
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticDump {
    path: Option<PathBuf>,
}

impl DiagnosticDump {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DiagnosticDump {
            path: Some(path.into()),
        }
    }

    /// A dump that never writes anything.
    pub fn disabled() -> Self {
        DiagnosticDump { path: None }
    }

    pub fn default_path() -> &'static Path {
        &DEFAULT_PATH
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the buffer, overwriting an earlier dump. Failures are logged
    /// and otherwise ignored, the caller has a more important error to report.
    pub fn write(&self, buf: &[u8]) -> bool {
        let path = match &self.path {
            Some(path) => path,
            None => return false,
        };
        match fs::write(path, buf) {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    len = buf.len(),
                    "wrote undecodable BLOB for analysis"
                );
                true
            }
            Err(err) => {
                warn!(path = %path.display(), "could not write undecodable BLOB: {}", err);
                false
            }
        }
    }
}

impl Default for DiagnosticDump {
    fn default() -> Self {
        DiagnosticDump::new(DiagnosticDump::default_path())
    }
}
