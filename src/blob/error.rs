use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("BLOB ended unexpectedly at offset {offset}, needed {needed} bytes but only {remaining} remain")]
    UnexpectedEndOfBuffer {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("Text field at offset {offset} contains byte {byte:#04X} that is undefined in code page 1252")]
    InvalidTextEncoding { offset: usize, byte: u8 },
    /// The format stores integers with their own width, but anything wider
    /// than a `u64` can only be a corrupt length.
    #[error("Integer at offset {offset} is {width} bytes wide, at most 8 are supported")]
    IntegerTooWide { offset: usize, width: usize },
}

impl Error {
    pub fn is_unexpected_end(&self) -> bool {
        matches!(self, Error::UnexpectedEndOfBuffer { .. })
    }
}
