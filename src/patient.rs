use crate::args::Patient;
use archivblob::document::{export_file_name, DocumentError};
use archivblob::gdt::{self, GdtError};
use chrono::Local;
use thiserror::Error;

pub fn patient(opts: &Patient) -> Result<(), PatientError> {
    let patient = gdt::read(&opts.gdt)?;
    println!("{}", patient);
    if let Some(birthdate) = &patient.birthdate {
        println!("born {}", birthdate);
    }
    let file_name = export_file_name(&patient, Local::now().naive_local())?;
    println!("export as {}", file_name);
    Ok(())
}

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("{0}")]
    Gdt(#[from] GdtError),
    #[error("{0}")]
    Export(#[from] DocumentError),
}
