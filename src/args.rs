use archivblob::blob::BlockKind;
use argh::FromArgs;
use serde::Deserialize;
use std::path::PathBuf;

/// Decode the category BLOBs of the practice database and show the resulting
/// categories.
#[derive(FromArgs)]
pub struct TopLevel {
    /// log decoding details to stderr.
    #[argh(switch, short = 'v')]
    pub verbose: bool,
    #[argh(subcommand)]
    pub invocation: Invocation,
}

/// Inner top-level command.
#[derive(FromArgs, Deserialize)]
#[argh(subcommand)]
#[serde(rename_all = "snake_case")]
pub enum Invocation {
    #[serde(skip)]
    Run(Run),
    Table(Table),
    Inspect(Inspect),
    Patient(Patient),
}

/// Take run parameters from a specified YAML file.
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
pub struct Run {
    #[argh(positional)]
    pub invocation: PathBuf,
}

/// Reconcile the category BLOBs and print the final category table.
///
/// BLOB paths not given on the command line are taken from the configuration.
#[derive(FromArgs, Deserialize, Debug, Default)]
#[argh(subcommand, name = "table")]
pub struct Table {
    /// file holding the raw memo categories BLOB.
    #[argh(option, short = 'm')]
    pub memo: Option<PathBuf>,
    /// file holding the raw letter categories BLOB.
    #[argh(option, short = 'l')]
    pub letters: Option<PathBuf>,
    /// file holding the raw archive categories BLOB.
    #[argh(option, short = 'a')]
    pub archive: Option<PathBuf>,
    /// file holding the raw category BLOB of older database versions.
    #[argh(option)]
    pub legacy: Option<PathBuf>,
    /// where to keep the memo BLOB if it cannot be decoded.
    #[argh(option, short = 'd')]
    pub dump: Option<PathBuf>,
    /// YAML configuration with BLOB paths, dump path and presets.
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,
    /// only show the categories selected by the preset with this name.
    #[argh(option, short = 'p')]
    pub preset: Option<String>,
}

/// Decode a single BLOB and print everything found in it as YAML.
#[derive(FromArgs, Deserialize, Debug)]
#[argh(subcommand, name = "inspect")]
pub struct Inspect {
    /// kind of BLOB, one of memo, letters, archive or legacy.
    #[argh(positional)]
    pub kind: BlockKind,
    /// file holding the raw BLOB.
    #[argh(positional)]
    pub file: PathBuf,
}

/// Show the patient handed over in a GDT file, along with the suggested
/// export file name.
#[derive(FromArgs, Deserialize, Debug)]
#[argh(subcommand, name = "patient")]
pub struct Patient {
    /// path to the GDT file.
    #[argh(positional)]
    pub gdt: PathBuf,
}
