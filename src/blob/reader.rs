use super::{Error, Result};
use crate::text::decode_cp1252;

/// Cursor over a BLOB that reads the length-prefixed fields every block is
/// built from.
///
/// The cursor only ever moves forward and never past the end of the buffer.
/// Any read that would need more bytes than remain fails with
/// [Error::UnexpectedEndOfBuffer] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        FieldReader { buf, pos: 0 }
    }

    /// Starts reading at the given offset. An offset past the end is clamped,
    /// so the first read fails instead of panicking.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        FieldReader {
            buf,
            pos: pos.min(buf.len()),
        }
    }

    /// Current offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails unless at least `needed` bytes remain, without moving the cursor.
    pub fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::UnexpectedEndOfBuffer {
                offset: self.pos,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Looks at the next `len` bytes without consuming them.
    pub fn peek(&self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        Ok(&self.buf[self.pos..self.pos + len])
    }

    /// Consumes exactly `len` bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Advances over `len` bytes of unknown meaning.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(drop)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    /// Two bytes little-endian, the width of every length prefix.
    pub fn u16(&mut self) -> Result<u16> {
        let bytes = self.bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Eight bytes as a little-endian IEEE-754 double.
    pub fn f64(&mut self) -> Result<f64> {
        let mut bytes = [0_u8; 8];
        bytes.copy_from_slice(self.bytes(8)?);
        Ok(f64::from_le_bytes(bytes))
    }

    /// Reads a little-endian unsigned integer of the given width in bytes.
    ///
    /// A width of zero reads nothing and yields zero.
    pub fn uint(&mut self, width: usize) -> Result<u64> {
        if width > 8 {
            return Err(Error::IntegerTooWide {
                offset: self.pos,
                width,
            });
        }
        let bytes = self.bytes(width)?;
        Ok(uint_le(bytes))
    }

    /// Reads a length-prefixed field: a two byte little-endian length `L`
    /// followed by `L` bytes of content.
    pub fn field(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let len = self.u16()? as usize;
        match self.bytes(len) {
            Ok(content) => Ok(content),
            Err(err) => {
                // do not leave the cursor between prefix and content
                self.pos = start;
                Err(err)
            }
        }
    }

    /// Skips a whole length-prefixed field.
    pub fn skip_field(&mut self) -> Result<()> {
        self.field().map(drop)
    }

    /// An integer stored as a length-prefixed field, where the length is
    /// the width of the integer, e.g. category IDs of one, two or four bytes.
    pub fn var_uint(&mut self) -> Result<u64> {
        let start = self.pos;
        let width = self.peek(2).map(|b| u16::from_le_bytes([b[0], b[1]]))? as usize;
        if width > 8 {
            return Err(Error::IntegerTooWide {
                offset: start + 2,
                width,
            });
        }
        self.field().map(uint_le)
    }

    /// Reads a length-prefixed text field. The last byte within the length
    /// is a terminator and not part of the text.
    pub fn text(&mut self) -> Result<String> {
        let content_offset = self.pos + 2;
        let content = self.field()?;
        decode_text(content, content_offset)
    }

    /// Reads `len` bytes of text whose length was already consumed separately,
    /// with the same terminator convention as [FieldReader::text].
    pub fn text_of_len(&mut self, len: usize) -> Result<String> {
        let content_offset = self.pos;
        let content = self.bytes(len)?;
        decode_text(content, content_offset)
    }
}

fn decode_text(content: &[u8], offset: usize) -> Result<String> {
    let without_terminator = &content[..content.len().saturating_sub(1)];
    decode_cp1252(without_terminator).map_err(|e| Error::InvalidTextEncoding {
        offset: offset + e.index,
        byte: e.byte,
    })
}

/// Interprets up to eight bytes as a little-endian unsigned integer.
pub fn uint_le(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8, "callers check the width");
    bytes
        .iter()
        .rev()
        .fold(0_u64, |acc, &byte| (acc << 8) | u64::from(byte))
}
