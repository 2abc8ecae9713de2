//! The field sequence shared by memo and legacy category records after the
//! display key.

use super::{FieldReader, Result};
use crate::category::{
    CategoryDetails, KeyCode, RecordShape, Rgb, StatusFlags, EXTENDED_MARKER_LIMIT,
};
use tracing::debug;

/// Only a color field of exactly this length holds three channels and a pad.
const COLOR_FIELD_LEN: u16 = 4;

/// How the optional color block after the key code looked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorBlock {
    /// Zero marker followed by a four byte color field.
    Rgb(Rgb),
    /// Zero marker followed by a field of some other length, skipped.
    Unrecognized,
    /// No zero marker.
    Unmarked,
}

impl ColorBlock {
    pub fn rgb(self) -> Option<Rgb> {
        match self {
            ColorBlock::Rgb(rgb) => Some(rgb),
            _ => None,
        }
    }
}

/// Reads the marker and, if it announces them, the extended fields.
///
/// The extended fields are, in order: secondary key (its length is the marker
/// itself), an unknown field, the status field, an unknown integer, the full
/// name, an unknown second key, the key code and the color block.
pub fn shape(reader: &mut FieldReader, filler: char) -> Result<(RecordShape, ColorBlock)> {
    let marker = reader.u16()?;
    if marker >= EXTENDED_MARKER_LIMIT {
        debug!(marker, "stub record without extended fields");
        return Ok((RecordShape::Minimal, ColorBlock::Unmarked));
    }

    let secondary_key = if marker > 0 {
        Some(reader.text_of_len(marker as usize)?)
    } else {
        None
    };
    reader.skip_field()?;
    let status = reader.field()?;
    let flags = StatusFlags::from(status.first().copied().unwrap_or(0));
    reader.skip_field()?;
    let full_name = reader.text()?;
    reader.skip_field()?;
    let key_code = KeyCode::padded(reader.text()?, filler);
    let color = color_block(reader)?;

    let details = CategoryDetails {
        secondary_key,
        full_name,
        key_code,
        color: color.rgb(),
        flags,
    };
    Ok((RecordShape::Extended(details), color))
}

fn color_block(reader: &mut FieldReader) -> Result<ColorBlock> {
    if reader.remaining() < 2 || reader.peek(2)? != [0x00, 0x00] {
        return Ok(ColorBlock::Unmarked);
    }
    reader.skip(2)?;
    let len = reader.u16()?;
    if len != COLOR_FIELD_LEN {
        reader.skip(len as usize)?;
        return Ok(ColorBlock::Unrecognized);
    }
    let red = reader.u8()?;
    let green = reader.u8()?;
    let blue = reader.u8()?;
    reader.skip(1)?;
    Ok(ColorBlock::Rgb(Rgb { red, green, blue }))
}

#[cfg(test)]
pub mod fixture {
    //! Writes the extended field sequence for memo and legacy fixtures.

    use crate::blob::fixture::{cp1252_terminated, Builder};
    use crate::category::Rgb;

    pub struct Extended<'a> {
        pub secondary_key: Option<&'a str>,
        pub status: u8,
        pub full_name: &'a str,
        pub key_code: &'a str,
        pub color: Option<Rgb>,
    }

    impl<'a> Extended<'a> {
        pub fn named(full_name: &'a str, key_code: &'a str) -> Self {
            Extended {
                secondary_key: None,
                status: 0,
                full_name,
                key_code,
                color: None,
            }
        }

        pub fn write(&self, builder: &mut Builder) {
            match self.secondary_key {
                Some(key) => {
                    let content = cp1252_terminated(key);
                    builder.u16(content.len() as u16).buf(&content);
                }
                None => {
                    builder.u16(0);
                }
            }
            builder
                .field(&[0xAA, 0xBB])
                .field(&[self.status])
                .var_uint(1, 2)
                .text(self.full_name)
                .field(&[])
                .text(self.key_code);
            if let Some(Rgb { red, green, blue }) = self.color {
                builder.u16(0).field(&[red, green, blue, 0]);
            }
        }
    }
}
