//! Reads the patient from a GDT file, the plain text exchange format used by
//! German practice software to hand over the current patient.
//!
//! Every line is `LLLFFFFcontent\r\n`, where `LLL` is the length of the line
//! including the line break and `FFFF` identifies the field.

use crate::text::decode_latin9;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const FIELD_PATIENT_ID: u16 = 3000;
const FIELD_NAME: u16 = 3101;
const FIELD_GIVEN_NAME: u16 = 3102;
const FIELD_BIRTHDATE: u16 = 3103;

/// Length and field ID.
const PREFIX_LEN: usize = 7;
const LINE_BREAK_LEN: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Patient {
    pub id: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    /// As written in the file, usually `DDMMYYYY`.
    pub birthdate: Option<String>,
}

impl Patient {
    /// The patient number, if present and numeric.
    pub fn id_number(&self) -> Option<u64> {
        self.id.as_deref().and_then(|id| id.trim().parse().ok())
    }
}

impl Display for Patient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} [{}]",
            self.name.as_deref().unwrap_or(""),
            self.given_name.as_deref().unwrap_or(""),
            self.id.as_deref().unwrap_or("?")
        )
    }
}

#[derive(Debug, Error)]
pub enum GdtError {
    #[error("Could not read GDT file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Malformed GDT line {line}, expected three digits of length and four digits of field ID")]
    MalformedLine { line: usize },
}

pub fn read(path: &Path) -> Result<Patient, GdtError> {
    let data = fs::read(path).map_err(|source| GdtError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&data)
}

/// Parses the fields of interest, ignoring all others. Later occurrences of a
/// field replace earlier ones.
pub fn parse(data: &[u8]) -> Result<Patient, GdtError> {
    let mut patient = Patient::default();
    for (index, line) in data.split(|&b| b == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        let number = index + 1;
        let (length, field) = prefix(line).ok_or(GdtError::MalformedLine { line: number })?;

        let end = length.saturating_sub(LINE_BREAK_LEN).min(line.len());
        let content = if end > PREFIX_LEN {
            decode_latin9(&line[PREFIX_LEN..end])
        } else {
            String::new()
        };

        let target = match field {
            FIELD_PATIENT_ID => &mut patient.id,
            FIELD_NAME => &mut patient.name,
            FIELD_GIVEN_NAME => &mut patient.given_name,
            FIELD_BIRTHDATE => &mut patient.birthdate,
            _ => continue,
        };
        debug!(field, content = %content, "GDT field");
        *target = Some(content);
    }
    Ok(patient)
}

fn prefix(line: &[u8]) -> Option<(usize, u16)> {
    let prefix = line.get(..PREFIX_LEN)?;
    if !prefix.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let number = |digits: &[u8]| {
        digits
            .iter()
            .fold(0usize, |acc, digit| acc * 10 + usize::from(digit - b'0'))
    };
    Some((number(&prefix[..3]), number(&prefix[3..]) as u16))
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(field: u16, content: &[u8]) -> Vec<u8> {
        let len = PREFIX_LEN + content.len() + LINE_BREAK_LEN;
        let mut line = format!("{:03}{:04}", len, field).into_bytes();
        line.extend_from_slice(content);
        line.extend_from_slice(b"\r\n");
        line
    }

    fn sample() -> Vec<u8> {
        [
            line(8000, b"6311"),
            line(3000, b"4711"),
            line(3101, b"M\xfcller"),
            line(3102, b"J\xfcrgen"),
            line(3103, b"01021950"),
            line(3110, b"1"),
        ]
        .concat()
    }

    #[test]
    fn reads_patient_fields() {
        let patient = parse(&sample()).unwrap();
        assert_eq!(
            patient,
            Patient {
                id: Some("4711".into()),
                name: Some("Müller".into()),
                given_name: Some("Jürgen".into()),
                birthdate: Some("01021950".into()),
            }
        );
        assert_eq!(patient.id_number(), Some(4711));
        assert_eq!(format!("{}", patient), "Müller, Jürgen [4711]");
    }

    #[test]
    fn latin9_specific_characters() {
        let patient = parse(&line(3101, b"\xa4uro")).unwrap();
        assert_eq!(patient.name.as_deref(), Some("€uro"));
    }

    #[test]
    fn content_is_cut_at_declared_length() {
        let mut data = b"0133101Meier".to_vec();
        data.extend_from_slice(b"XYZ\r\n");
        let patient = parse(&data).unwrap();
        assert_eq!(patient.name.as_deref(), Some("Meie"));
    }

    #[test]
    fn missing_line_break_and_missing_fields() {
        let patient = parse(b"0123000815").unwrap();
        assert_eq!(patient.id.as_deref(), Some("815"));
        assert_eq!(patient.name, None);
        assert_eq!(patient.birthdate, None);
    }

    #[test]
    fn malformed_line() {
        let mut data = line(3000, b"1");
        data.extend_from_slice(b"xx3101Name\r\n");
        match parse(&data) {
            Err(GdtError::MalformedLine { line: 2 }) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patient.gdt");
        fs::write(&path, sample()).unwrap();
        assert_eq!(read(&path).unwrap().id_number(), Some(4711));
        assert!(matches!(
            read(&dir.path().join("none.gdt")),
            Err(GdtError::Io { .. })
        ));
    }
}
