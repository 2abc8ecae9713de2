//! Builds BLOB fixtures for tests, the inverse of [super::reader::FieldReader].

use crate::text::encode_cp1252;
use std::mem::take;

pub struct Builder {
    data: Vec<u8>,
}

impl Builder {
    pub fn new() -> Self {
        Builder { data: vec![] }
    }

    pub fn u8(&mut self, data: u8) -> &mut Self {
        self.data.push(data);
        self
    }

    /// Appends a number in little-endian byte order.
    pub fn u16(&mut self, data: u16) -> &mut Self {
        self.buf(&data.to_le_bytes())
    }

    pub fn f64(&mut self, data: f64) -> &mut Self {
        self.buf(&data.to_le_bytes())
    }

    /// Appends raw bytes.
    pub fn buf(&mut self, data: &[u8]) -> &mut Self {
        self.data.extend(data);
        self
    }

    /// Appends a two byte length and then the content.
    pub fn field(&mut self, content: &[u8]) -> &mut Self {
        assert!(content.len() <= 0xFFFF, "field content too long");
        self.u16(content.len() as u16).buf(content)
    }

    /// Appends a length-prefixed field holding `value` in `width` bytes.
    pub fn var_uint(&mut self, value: u64, width: usize) -> &mut Self {
        let bytes = value.to_le_bytes();
        self.field(&bytes[..width])
    }

    /// Appends a length-prefixed, NUL terminated code page 1252 text.
    pub fn text(&mut self, text: &str) -> &mut Self {
        let content = cp1252_terminated(text);
        self.field(&content)
    }

    /// Appends code page 1252 text with its terminator, but without any length.
    pub fn raw_text(&mut self, text: &str) -> &mut Self {
        let content = cp1252_terminated(text);
        self.buf(&content)
    }

    /// Appends a nested builder's contents as a length-prefixed entry.
    pub fn entry(&mut self, entry: &mut Builder) -> &mut Self {
        let content = entry.build();
        self.field(&content)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Takes the contents, leaving an empty builder in place.
    pub fn build(&mut self) -> Vec<u8> {
        take(&mut self.data)
    }
}

pub fn cp1252_terminated(text: &str) -> Vec<u8> {
    let mut content: Vec<u8> = text
        .chars()
        .map(|c| encode_cp1252(c).expect("fixture text must be representable in cp1252"))
        .collect();
    content.push(0x00);
    content
}
