//! Archived documents of a patient, as listed next to the categories.

use crate::category::CategoryId;
use crate::gdt::Patient;
use crate::reconcile::CategoryTable;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: u64,
    pub description: String,
    pub category: CategoryId,
    pub recorded: NaiveDateTime,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Document {id} has a timestamp out of range: day {day}, second {seconds}")]
    TimestampOutOfRange { id: u64, day: i32, seconds: i32 },
    #[error("Patient {0} has no numeric ID")]
    PatientWithoutId(String),
}

/// Day zero of the database's date columns.
fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1890, 1, 1).and_then(|date| date.and_hms_opt(0, 0, 0))
}

impl Document {
    /// Builds a document from an archive row, where the time is stored as
    /// days since 1890-01-01 and seconds into that day.
    pub fn from_row(
        id: u64,
        description: impl Into<String>,
        category: CategoryId,
        day: i32,
        seconds: i32,
    ) -> Result<Document, DocumentError> {
        let offset = Duration::days(day.into()) + Duration::seconds(seconds.into());
        let recorded = epoch()
            .and_then(|epoch| epoch.checked_add_signed(offset))
            .ok_or(DocumentError::TimestampOutOfRange { id, day, seconds })?;
        Ok(Document {
            id,
            description: description.into(),
            category,
            recorded,
        })
    }

    /// Category name, or the raw ID if the category is gone.
    pub fn category_label<'t>(&self, table: &'t CategoryTable) -> Cow<'t, str> {
        table.display_label_for(self.category)
    }

    /// Title of the document in a merged PDF.
    pub fn bookmark_title(&self) -> String {
        format!(
            "{} {}",
            self.description,
            self.recorded.format("%d.%m.%Y %H:%M")
        )
    }
}

/// Newest first, as the archive is listed.
pub fn sort_newest_first(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.recorded.cmp(&a.recorded));
}

/// Suggested file name when exporting documents of a patient.
pub fn export_file_name(patient: &Patient, now: NaiveDateTime) -> Result<String, DocumentError> {
    let id = patient
        .id_number()
        .ok_or_else(|| DocumentError::PatientWithoutId(patient.to_string()))?;
    Ok(format!(
        "Patientenakte_{}_{}_{}_{}-{}.pdf",
        id,
        patient.name.as_deref().unwrap_or(""),
        patient.given_name.as_deref().unwrap_or(""),
        patient.birthdate.as_deref().unwrap_or(""),
        now.format("%Y%m%d%H%M%S")
    ))
}
