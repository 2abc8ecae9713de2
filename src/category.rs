//! The decoded category record shared by the memo and legacy blocks.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

pub type CategoryId = u64;

/// Marker value below which a memo or legacy record carries the extended
/// fields. Records with a marker of this value or above are stubs.
pub const EXTENDED_MARKER_LIMIT: u16 = 20;

/// A color as stored in the format, one byte per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Behaviour of a category, unpacked from a single status byte.
///
/// Two of the bits are negative: a set bit turns the option *off*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    /// Whether the category is offered in selection lists at all.
    pub use_category: bool,
    pub day_protocol: bool,
    pub auto_send: bool,
    pub emergency_send: bool,
}

impl StatusFlags {
    const NOT_USE_CATEGORY: u8 = 0b0000_1000;
    const NOT_DAY_PROTOCOL: u8 = 0b0000_0100;
    const AUTO_SEND: u8 = 0b0000_0001;
    const EMERGENCY_SEND: u8 = 0b0000_0010;
}

impl Default for StatusFlags {
    fn default() -> Self {
        StatusFlags::from(0)
    }
}

impl From<u8> for StatusFlags {
    fn from(status_byte: u8) -> Self {
        StatusFlags {
            use_category: status_byte & Self::NOT_USE_CATEGORY == 0,
            day_protocol: status_byte & Self::NOT_DAY_PROTOCOL == 0,
            auto_send: status_byte & Self::AUTO_SEND != 0,
            emergency_send: status_byte & Self::EMERGENCY_SEND != 0,
        }
    }
}

/// Short code used to join entries of different blocks when no ID is given.
///
/// Codes decoded shorter than two characters get a block specific filler
/// character prepended. The filler has to match what the other blocks use or
/// joins will silently miss.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyCode(String);

impl KeyCode {
    pub const MEMO_FILLER: char = 'x';
    pub const LEGACY_FILLER: char = 'x';
    pub const LETTER_FILLER: char = 'q';
    pub const ARCHIVE_FILLER: char = 's';

    /// Wraps a decoded code, padding it with `filler` if it is too short.
    pub fn padded(decoded: String, filler: char) -> Self {
        if decoded.chars().count() < 2 {
            let mut padded = String::with_capacity(decoded.len() + 1);
            padded.push(filler);
            padded.push_str(&decoded);
            KeyCode(padded)
        } else {
            KeyCode(decoded)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares to a display key as the format expects, ignoring case.
    pub fn matches(&self, display_key: &str) -> bool {
        self.0.to_lowercase() == display_key.to_lowercase()
    }
}

impl Display for KeyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A category as defined in the memo block, or in the legacy block that
/// preceded it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    /// Short label, called _Krankenblatt_ in the application.
    pub display_key: String,
    pub shape: RecordShape,
}

/// The marker field read after the display key decides which fields follow.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RecordShape {
    /// Marker at or above [EXTENDED_MARKER_LIMIT]: nothing but ID and key.
    Minimal,
    Extended(CategoryDetails),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryDetails {
    /// Called _Auftrag_ in the application, present only for non-zero markers.
    pub secondary_key: Option<String>,
    pub full_name: String,
    pub key_code: KeyCode,
    pub color: Option<Rgb>,
    pub flags: StatusFlags,
}

impl CategoryRecord {
    pub fn details(&self) -> Option<&CategoryDetails> {
        match &self.shape {
            RecordShape::Minimal => None,
            RecordShape::Extended(details) => Some(details),
        }
    }

    pub fn full_name(&self) -> Option<&str> {
        self.details().map(|d| d.full_name.as_str())
    }

    pub fn key_code(&self) -> Option<&KeyCode> {
        self.details().map(|d| &d.key_code)
    }

    pub fn color(&self) -> Option<Rgb> {
        self.details().and_then(|d| d.color)
    }

    /// Stubs carry no status byte and keep the defaults.
    pub fn flags(&self) -> StatusFlags {
        self.details().map(|d| d.flags).unwrap_or_default()
    }

    pub fn use_category(&self) -> bool {
        self.flags().use_category
    }

    /// The best name available: the full name, or the display key for stubs.
    pub fn name(&self) -> &str {
        self.full_name().unwrap_or(&self.display_key)
    }
}
