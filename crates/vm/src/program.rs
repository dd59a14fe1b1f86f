//! Defines the [`Program`] type and the textual program image format it is parsed from.
//!
//! # Format
//!
//! A program image is a text file with one byte per line, written as a binary literal:
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```
//!
//! Blank lines and lines whose first non-whitespace character is `#` are skipped. On any other
//! line, only the first whitespace-delimited token is significant.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::error::Error;
use crate::memory::MEMORY_SIZE;

/// The program used when no program image could be read: loads `8` into `R0`, prints it and
/// halts.
pub const DEFAULT_PROGRAM: [u8; 6] = [
    0b1000_0010, // LDI R0,8
    0b0000_0000,
    0b0000_1000,
    0b0100_0111, // PRN R0
    0b0000_0000,
    0b0000_0001, // HLT
];

/// An error that might occur when reading a program image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The image could not be read.
    #[error("cannot read program image: {0}")]
    Io(#[from] std::io::Error),
    /// A line of the image does not start with an 8-bit binary literal.
    #[error("line {line}: `{token}` is not an 8-bit binary literal")]
    Parse {
        /// The 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// The image is valid but cannot be loaded.
    #[error(transparent)]
    Vm(#[from] Error),
}

/// A sequence of bytes to be loaded into memory at address `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            bytes: DEFAULT_PROGRAM.to_vec(),
        }
    }
}

impl Program {
    /// Creates a new [`Program`] from raw bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ProgramTooLarge`] if the program does not fit in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        if bytes.len() > MEMORY_SIZE {
            return Err(Error::ProgramTooLarge(bytes.len()));
        }
        Ok(Self { bytes })
    }

    /// Parses a textual program image.
    pub fn parse(src: &str) -> Result<Self, ImageError> {
        let mut bytes = Vec::new();

        for (index, line) in src.lines().enumerate() {
            let Some(token) = line.split_whitespace().next() else {
                continue;
            };

            if token.starts_with('#') {
                continue;
            }

            let byte = parse_byte(token).ok_or_else(|| ImageError::Parse {
                line: index + 1,
                token: token.to_owned(),
            })?;

            bytes.push(byte);
        }

        Ok(Self::from_bytes(bytes)?)
    }

    /// Reads and parses the program image at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let src = fs::read_to_string(path)?;
        Self::parse(&src)
    }

    /// Reads and parses the program image at `path`, falling back to the
    /// [default program](DEFAULT_PROGRAM) if the file cannot be read.
    ///
    /// Only I/O failures are recovered from; a malformed image is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        match Self::from_file(path) {
            Err(ImageError::Io(err)) => {
                warn!(path = %path.display(), %err, "cannot read program image, using the default program");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Returns the bytes of the program.
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Parses a base-2 literal of at most 8 significant bits.
fn parse_byte(token: &str) -> Option<u8> {
    // `from_str_radix` would also accept a leading sign.
    if !token.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(token, 2).ok()
}
