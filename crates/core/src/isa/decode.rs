//! RV32I instruction decoder.
//!
//! Maps a 32-bit little-endian instruction word onto the tagged
//! [`Instruction`] enum. It handles:
//! 1. **Field extraction:** opcode, register indices, funct3/funct7.
//! 2. **Immediates:** reconstruction and sign extension for the I/S/B/U/J
//!    formats, including the scattered B- and J-type bit layouts.
//! 3. **Discrimination:** funct7 selection of SUB/SRA/SRAI and shift-amount
//!    masking for the immediate shift instructions.
//!
//! Anything that does not match an RV32I base encoding decodes to
//! [`Instruction::Invalid`].

use crate::isa::instruction::{AluOp, BranchOp, IOp, Instruction, LoadOp, StoreOp, UpperOp};
use crate::isa::opcodes;

/// Sign-extends the low `bits` bits of `value`.
#[inline]
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Decodes a 32-bit instruction word.
///
/// # Arguments
///
/// * `word` - The raw little-endian instruction word.
///
/// # Returns
///
/// The decoded instruction, or [`Instruction::Invalid`] for encodings
/// outside the RV32I base set.
pub fn decode(word: u32) -> Instruction {
    let opcode = word & 0x7F;
    let rd = ((word >> 7) & 0x1F) as usize;
    let funct3 = (word >> 12) & 0x7;
    let rs1 = ((word >> 15) & 0x1F) as usize;
    let rs2 = ((word >> 20) & 0x1F) as usize;
    let funct7 = (word >> 25) & 0x7F;

    match opcode {
        opcodes::OP_LUI => Instruction::U {
            op: UpperOp::Lui,
            rd,
            imm: (word & 0xFFFF_F000) as i32,
        },
        opcodes::OP_AUIPC => Instruction::U {
            op: UpperOp::Auipc,
            rd,
            imm: (word & 0xFFFF_F000) as i32,
        },

        opcodes::OP_JAL => {
            let imm_val = ((word >> 12) & 0xFF) << 12 // imm[19:12]
                | ((word >> 20) & 0x1) << 11          // imm[11]
                | ((word >> 21) & 0x3FF) << 1         // imm[10:1]
                | ((word >> 31) & 0x1) << 20;         // imm[20]
            Instruction::J {
                rd,
                imm: sign_extend(imm_val, 21),
            }
        }

        opcodes::OP_JALR => {
            if funct3 != 0b000 {
                return Instruction::Invalid;
            }
            Instruction::I {
                op: IOp::Jalr,
                rd,
                rs1,
                imm: sign_extend(word >> 20, 12),
            }
        }

        opcodes::OP_BRANCH => {
            let imm_val = ((word >> 7) & 0x1) << 11 // imm[11]
                | ((word >> 8) & 0xF) << 1          // imm[4:1]
                | ((word >> 25) & 0x3F) << 5        // imm[10:5]
                | ((word >> 31) & 0x1) << 12;       // imm[12]
            let imm = sign_extend(imm_val, 13);
            let op = match funct3 {
                0b000 => BranchOp::Beq,
                0b001 => BranchOp::Bne,
                0b100 => BranchOp::Blt,
                0b101 => BranchOp::Bge,
                0b110 => BranchOp::Bltu,
                0b111 => BranchOp::Bgeu,
                _ => return Instruction::Invalid,
            };
            Instruction::B { op, rs1, rs2, imm }
        }

        opcodes::OP_LOAD => {
            let op = match funct3 {
                0b000 => LoadOp::Lb,
                0b001 => LoadOp::Lh,
                0b010 => LoadOp::Lw,
                0b100 => LoadOp::Lbu,
                0b101 => LoadOp::Lhu,
                _ => return Instruction::Invalid,
            };
            Instruction::I {
                op: IOp::Load(op),
                rd,
                rs1,
                imm: sign_extend(word >> 20, 12),
            }
        }

        opcodes::OP_STORE => {
            let imm_val = ((word >> 7) & 0x1F) | (((word >> 25) & 0x7F) << 5);
            let imm = sign_extend(imm_val, 12);
            let op = match funct3 {
                0b000 => StoreOp::Sb,
                0b001 => StoreOp::Sh,
                0b010 => StoreOp::Sw,
                _ => return Instruction::Invalid,
            };
            Instruction::S { op, rs1, rs2, imm }
        }

        opcodes::OP_IMM => {
            let mut imm = sign_extend(word >> 20, 12);
            let op = match funct3 {
                0b000 => AluOp::Add,
                0b010 => AluOp::Slt,
                0b011 => AluOp::Sltu,
                0b100 => AluOp::Xor,
                0b110 => AluOp::Or,
                0b111 => AluOp::And,
                0b001 => {
                    imm &= 0x1F; // shamt
                    AluOp::Sll
                }
                0b101 => {
                    let op = if funct7 == opcodes::FUNCT7_ALT {
                        AluOp::Sra
                    } else {
                        AluOp::Srl
                    };
                    imm &= 0x1F; // shamt
                    op
                }
                _ => return Instruction::Invalid,
            };
            Instruction::I {
                op: IOp::Arith(op),
                rd,
                rs1,
                imm,
            }
        }

        opcodes::OP_REG => {
            let op = match funct3 {
                0b000 => {
                    if funct7 == opcodes::FUNCT7_ALT {
                        AluOp::Sub
                    } else {
                        AluOp::Add
                    }
                }
                0b001 => AluOp::Sll,
                0b010 => AluOp::Slt,
                0b011 => AluOp::Sltu,
                0b100 => AluOp::Xor,
                0b101 => {
                    if funct7 == opcodes::FUNCT7_ALT {
                        AluOp::Sra
                    } else {
                        AluOp::Srl
                    }
                }
                0b110 => AluOp::Or,
                0b111 => AluOp::And,
                _ => return Instruction::Invalid,
            };
            Instruction::R { op, rd, rs1, rs2 }
        }

        _ => Instruction::Invalid,
    }
}
