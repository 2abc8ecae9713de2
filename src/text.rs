//! Single-byte text encodings found in the legacy data.
//!
//! Text inside the BLOBs is Windows code page 1252, GDT patient files are
//! written in ISO-8859-15. Both agree with Latin-1 for most of the byte range,
//! so only the deviating rows are tabulated here.

use thiserror::Error;

/// Mapping of the bytes 0x80–0x9F in code page 1252. `None` marks the five
/// bytes that have no assigned character.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// A byte without a character in code page 1252, at the given index into
/// the decoded slice.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("byte {byte:#04X} at index {index} is undefined in code page 1252")]
pub struct Undecodable {
    pub index: usize,
    pub byte: u8,
}

/// Decodes code page 1252 text, failing on the first undefined byte.
pub fn decode_cp1252(bytes: &[u8]) -> Result<String, Undecodable> {
    let mut text = String::with_capacity(bytes.len());
    for (index, &byte) in bytes.iter().enumerate() {
        let decoded = match byte {
            0x80..=0x9F => CP1252_HIGH[(byte - 0x80) as usize],
            _ => Some(byte as char),
        };
        match decoded {
            Some(c) => text.push(c),
            None => return Err(Undecodable { index, byte }),
        }
    }
    Ok(text)
}

/// Encodes a single character as code page 1252, if representable.
#[cfg(test)]
pub fn encode_cp1252(c: char) -> Option<u8> {
    match c as u32 {
        0x00..=0x7F | 0xA0..=0xFF => Some(c as u32 as u8),
        _ => CP1252_HIGH
            .iter()
            .position(|&high| high == Some(c))
            .map(|idx| 0x80 + idx as u8),
    }
}

/// Decodes ISO-8859-15 text. Every byte is assigned, so this never fails.
pub fn decode_latin9(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&byte| match byte {
            0xA4 => '\u{20AC}',
            0xA6 => '\u{0160}',
            0xA8 => '\u{0161}',
            0xB4 => '\u{017D}',
            0xB8 => '\u{017E}',
            0xBC => '\u{0152}',
            0xBD => '\u{0153}',
            0xBE => '\u{0178}',
            other => other as char,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(decode_cp1252(b"Befund").unwrap(), "Befund");
    }

    #[test]
    fn umlauts_and_euro() {
        assert_eq!(
            decode_cp1252(&[0x80, b' ', 0xC4, 0xF6, 0xDF]).unwrap(),
            "€ Äöß"
        );
    }

    #[test]
    fn undefined_bytes_fail() {
        for &byte in &[0x81_u8, 0x8D, 0x8F, 0x90, 0x9D] {
            assert_eq!(
                decode_cp1252(&[b'a', byte]).unwrap_err(),
                Undecodable { index: 1, byte },
                "Expected {:#04X} to be rejected",
                byte
            );
        }
    }

    #[test]
    fn encode_is_inverse_of_decode() {
        for byte in 0_u8..=255 {
            if let Ok(text) = decode_cp1252(&[byte]) {
                let c = text.chars().next().unwrap();
                assert_eq!(encode_cp1252(c), Some(byte));
            }
        }
        assert_eq!(encode_cp1252('\u{4E2D}'), None);
    }

    #[test]
    fn latin9_differs_from_cp1252() {
        assert_eq!(decode_latin9(&[0xA4, 0xE9, 0xBD]), "€éœ");
    }
}
