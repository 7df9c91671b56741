//! RV32I instruction set support.

/// Instruction decoder (32-bit word to tagged instruction).
pub mod decode;
/// Tagged instruction representation and operation enums.
pub mod instruction;
/// Major opcode constants.
pub mod opcodes;

pub use decode::decode;
pub use instruction::Instruction;
