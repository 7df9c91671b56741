//! Program image loader.
//!
//! Parses the textual image format into a byte-addressed map:
//! 1. A line starting with `@HEXADDR` sets the current byte address.
//! 2. Other lines hold whitespace-separated 2-hex-digit bytes written at
//!    successive addresses.
//! 3. Blank lines are skipped; the file ends at EOF.
//!
//! The same image backs both instruction fetch and the initial contents of
//! data memory. Malformed input is a fatal [`SimError::Loader`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::common::SimError;

/// A loaded program image: sparse bytes over a 32-bit address space.
#[derive(Clone, Debug, Default)]
pub struct ProgramImage {
    bytes: HashMap<u32, u8>,
}

impl ProgramImage {
    /// Loads an image from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let file = File::open(path.as_ref()).map_err(|e| SimError::Loader {
            line: 0,
            msg: format!("could not open '{}': {}", path.as_ref().display(), e),
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Loads an image from standard input.
    pub fn from_stdin() -> Result<Self, SimError> {
        Self::from_reader(io::stdin().lock())
    }

    /// Parses the text format from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, SimError> {
        let mut bytes = HashMap::new();
        let mut addr: u32 = 0;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| SimError::Loader {
                line: line_no,
                msg: format!("read error: {}", e),
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(hex) = line.strip_prefix('@') {
                addr = u32::from_str_radix(hex.trim(), 16).map_err(|_| SimError::Loader {
                    line: line_no,
                    msg: format!("bad address '@{}'", hex),
                })?;
            } else {
                for token in line.split_whitespace() {
                    let byte = u8::from_str_radix(token, 16).map_err(|_| SimError::Loader {
                        line: line_no,
                        msg: format!("bad byte '{}'", token),
                    })?;
                    bytes.insert(addr, byte);
                    addr = addr.wrapping_add(1);
                }
            }
        }

        Ok(Self { bytes })
    }

    /// Fetches a 32-bit little-endian instruction word.
    ///
    /// Returns `None` if any of the four bytes is unmapped, which the fetch
    /// stage treats like an undecodable word (a wrong-path or runaway PC).
    pub fn fetch_word(&self, addr: u32) -> Option<u32> {
        let mut word = 0u32;
        for i in 0..4 {
            let byte = *self.bytes.get(&addr.wrapping_add(i))?;
            word |= (byte as u32) << (8 * i);
        }
        Some(word)
    }

    /// The raw byte map, used to initialize data memory.
    pub fn bytes(&self) -> &HashMap<u32, u8> {
        &self.bytes
    }
}
