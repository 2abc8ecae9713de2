use crate::args::{Invocation, Run};
use serde_yaml::from_reader;
use std::fs::File;
use thiserror::Error;

pub fn run(invocation: Invocation) -> Result<(), String> {
    match invocation {
        Invocation::Run(run) => run_yaml(run).map_err(|e| format!("{}", e)),
        Invocation::Table(table) => crate::table::table(&table).map_err(|e| format!("{}", e)),
        Invocation::Inspect(inspect) => {
            crate::inspect::inspect(&inspect).map_err(|e| format!("{}", e))
        }
        Invocation::Patient(patient) => {
            crate::patient::patient(&patient).map_err(|e| format!("{}", e))
        }
    }
}

fn run_yaml(opts: Run) -> Result<(), RunError> {
    let file = File::open(opts.invocation)?;
    let invocation = from_reader(file)?;
    run(invocation).map_err(RunError::Cmd)
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Could not open specified YAML invocation file: {0}")]
    IO(#[from] std::io::Error),
    #[error("Could not parse specified YAML invocation file: {0}")]
    Deserialize(#[from] serde_yaml::Error),
    #[error("{0}")]
    Cmd(String),
}
