//! Simulator error definitions.
//!
//! Fatal conditions only: a malformed or unreadable program image, and an
//! invalid instruction that can never be repaired by misprediction recovery.
//! Structural hazards (full ROB/RS/LSB) and broadcasts for flushed tags are
//! ordinary stall/no-op conditions and never surface here.

use std::fmt;

/// Fatal simulator errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// The program image could not be read or parsed.
    ///
    /// Carries the 1-based line number of the offending input line and a
    /// description of the problem. Line 0 means the input itself was
    /// unreadable.
    Loader { line: usize, msg: String },

    /// An instruction word that decodes to no RV32I encoding reached the
    /// issue stage with an empty reorder buffer, so no in-flight branch can
    /// ever redirect the PC away from it.
    InvalidInstruction { pc: u32, word: u32 },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Loader { line, msg } => {
                if *line == 0 {
                    write!(f, "loader: {}", msg)
                } else {
                    write!(f, "loader: line {}: {}", line, msg)
                }
            }
            SimError::InvalidInstruction { pc, word } => {
                write!(f, "invalid instruction {:#010x} at pc {:#x}", word, pc)
            }
        }
    }
}

impl std::error::Error for SimError {}
