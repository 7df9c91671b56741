//! RISC-V ABI register indices.
//!
//! Only the registers the simulator itself needs by name; everything else is
//! addressed by raw index.

/// Hardwired zero register (x0).
pub const REG_ZERO: usize = 0;

/// Return address register (x1 / ra), written by JAL and JALR.
pub const REG_RA: usize = 1;

/// First argument / return value register (x10 / a0). The low eight bits of
/// this register are the simulator's exit value.
pub const REG_A0: usize = 10;
