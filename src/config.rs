//! Settings read from a YAML file.

use crate::dump::DiagnosticDump;
use crate::preset::{Preset, Presets};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to keep memo BLOBs that failed to decode.
    pub dump_path: Option<PathBuf>,
    pub presets: Vec<Preset>,
    /// Files holding the raw BLOB columns.
    pub memo: Option<PathBuf>,
    pub letters: Option<PathBuf>,
    pub archive: Option<PathBuf>,
    pub legacy: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not access configuration file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Could not parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Could not serialize configuration for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl Config {
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_reader(file).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Config, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Writes the configuration, creating missing parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_error)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|source| ConfigError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, yaml).map_err(io_error)
    }

    pub fn dump(&self) -> DiagnosticDump {
        match &self.dump_path {
            Some(path) => DiagnosticDump::new(path),
            None => DiagnosticDump::default(),
        }
    }

    pub fn presets(&self) -> Presets {
        Presets::new(self.presets.clone())
    }

    pub fn set_presets(&mut self, presets: &Presets) {
        self.presets = presets.to_saved();
    }
}
