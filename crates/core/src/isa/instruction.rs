//! Tagged instruction representation.
//!
//! A decoded instruction is a tagged sum over the six RV32I formats plus an
//! `Invalid` variant for unrecognized encodings. Components match on the tag;
//! there is no dynamic dispatch anywhere in the pipeline.

use std::fmt;

/// Integer ALU operation, shared by R-type and I-type arithmetic.
///
/// `Addi` and friends map onto the same operations as their register forms,
/// so the ALU only ever sees this enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    /// Shift left logical (shift amount = low 5 bits of operand b).
    Sll,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Set if less than (signed).
    Slt,
    /// Set if less than (unsigned).
    Sltu,
}

/// Load operation width and sign treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOp {
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
}

/// Store operation width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOp {
    Sb,
    Sh,
    Sw,
}

/// Conditional branch comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchOp {
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
}

/// Upper-immediate operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpperOp {
    Lui,
    Auipc,
}

/// I-type operation subtype: arithmetic, load, or JALR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IOp {
    Arith(AluOp),
    Load(LoadOp),
    Jalr,
}

/// A decoded RV32I instruction.
///
/// Immediates are sign-extended at decode time. The U-type immediate keeps
/// bits 31:12 in place (high field), so `LUI` writes it directly and `AUIPC`
/// adds it to the fetch PC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    R { op: AluOp, rd: usize, rs1: usize, rs2: usize },
    I { op: IOp, rd: usize, rs1: usize, imm: i32 },
    S { op: StoreOp, rs1: usize, rs2: usize, imm: i32 },
    B { op: BranchOp, rs1: usize, rs2: usize, imm: i32 },
    U { op: UpperOp, rd: usize, imm: i32 },
    J { rd: usize, imm: i32 },
    /// Unrecognized encoding. Issuing one is an input error.
    Invalid,
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction::Invalid
    }
}

/// Memory operation carried by a load-store buffer entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemOp {
    Load(LoadOp),
    Store(StoreOp),
}

impl MemOp {
    /// Returns true for load operations.
    #[inline]
    pub fn is_load(&self) -> bool {
        matches!(self, MemOp::Load(_))
    }

    /// Returns true for store operations.
    #[inline]
    pub fn is_store(&self) -> bool {
        matches!(self, MemOp::Store(_))
    }
}

impl Instruction {
    /// Destination register, if the instruction writes one.
    ///
    /// `x0` destinations are reported here like any other; the register file
    /// is what drops the write.
    pub fn dest_reg(&self) -> Option<usize> {
        match *self {
            Instruction::R { rd, .. }
            | Instruction::I { rd, .. }
            | Instruction::U { rd, .. }
            | Instruction::J { rd, .. } => Some(rd),
            Instruction::S { .. } | Instruction::B { .. } | Instruction::Invalid => None,
        }
    }

    /// First source register, if any.
    pub fn src1(&self) -> Option<usize> {
        match *self {
            Instruction::R { rs1, .. }
            | Instruction::I { rs1, .. }
            | Instruction::S { rs1, .. }
            | Instruction::B { rs1, .. } => Some(rs1),
            Instruction::U { .. } | Instruction::J { .. } | Instruction::Invalid => None,
        }
    }

    /// Second source register, if any.
    pub fn src2(&self) -> Option<usize> {
        match *self {
            Instruction::R { rs2, .. }
            | Instruction::S { rs2, .. }
            | Instruction::B { rs2, .. } => Some(rs2),
            _ => None,
        }
    }

    /// Sign-extended immediate, if the format carries one.
    pub fn imm(&self) -> Option<i32> {
        match *self {
            Instruction::I { imm, .. }
            | Instruction::S { imm, .. }
            | Instruction::B { imm, .. }
            | Instruction::U { imm, .. }
            | Instruction::J { imm, .. } => Some(imm),
            Instruction::R { .. } | Instruction::Invalid => None,
        }
    }

    /// Memory operation for loads and stores, `None` otherwise.
    pub fn mem_op(&self) -> Option<MemOp> {
        match *self {
            Instruction::I { op: IOp::Load(op), .. } => Some(MemOp::Load(op)),
            Instruction::S { op, .. } => Some(MemOp::Store(op)),
            _ => None,
        }
    }

    /// True for conditional branches.
    #[inline]
    pub fn is_branch(&self) -> bool {
        matches!(self, Instruction::B { .. })
    }

    /// True for stores.
    #[inline]
    pub fn is_store(&self) -> bool {
        matches!(self, Instruction::S { .. })
    }
}

impl fmt::Display for Instruction {
    /// Compact mnemonic form used by trace output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::R { op, rd, rs1, rs2 } => {
                write!(f, "{:?} x{}, x{}, x{}", op, rd, rs1, rs2)
            }
            Instruction::I { op: IOp::Arith(op), rd, rs1, imm } => {
                write!(f, "{:?}I x{}, x{}, {}", op, rd, rs1, imm)
            }
            Instruction::I { op: IOp::Load(op), rd, rs1, imm } => {
                write!(f, "{:?} x{}, {}(x{})", op, rd, imm, rs1)
            }
            Instruction::I { op: IOp::Jalr, rd, rs1, imm } => {
                write!(f, "Jalr x{}, {}(x{})", rd, imm, rs1)
            }
            Instruction::S { op, rs1, rs2, imm } => {
                write!(f, "{:?} x{}, {}(x{})", op, rs2, imm, rs1)
            }
            Instruction::B { op, rs1, rs2, imm } => {
                write!(f, "{:?} x{}, x{}, {}", op, rs1, rs2, imm)
            }
            Instruction::U { op, rd, imm } => write!(f, "{:?} x{}, {:#x}", op, rd, imm),
            Instruction::J { rd, imm } => write!(f, "Jal x{}, {}", rd, imm),
            Instruction::Invalid => write!(f, "<invalid>"),
        }
    }
}
