//! Integer ALU.
//!
//! A single-cycle unit with a one-entry pipeline register: an operation
//! accepted this cycle produces its result on the common data bus at the
//! start of the next cycle. Covers the RV32I integer operations; shift
//! amounts use the low five bits of the second operand, SRL shifts
//! logically, SRA arithmetically.

use crate::core::rob::RobTag;
use crate::isa::instruction::AluOp;

/// An operation latched for execution.
#[derive(Clone, Copy, Debug)]
struct AluRequest {
    a: i32,
    b: i32,
    op: AluOp,
    dest_tag: RobTag,
}

/// A completed operation, to be published on the common data bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluResult {
    pub dest_tag: RobTag,
    pub value: i32,
}

/// One-entry pipelined integer unit.
#[derive(Default)]
pub struct Alu {
    request: Option<AluRequest>,
}

impl Alu {
    /// Creates an idle ALU.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the unit can accept an operation this cycle.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.request.is_none()
    }

    /// Latches an operation. The caller must check [`Alu::is_free`] first.
    pub fn accept(&mut self, a: i32, b: i32, op: AluOp, dest_tag: RobTag) {
        debug_assert!(self.is_free());
        self.request = Some(AluRequest { a, b, op, dest_tag });
    }

    /// Advances one cycle: executes the latched operation, if any, and
    /// returns its result for broadcast.
    pub fn tick(&mut self) -> Option<AluResult> {
        self.request.take().map(|req| AluResult {
            dest_tag: req.dest_tag,
            value: execute(req.a, req.b, req.op),
        })
    }

    /// Cancels any in-flight work (misprediction recovery).
    pub fn flush(&mut self) {
        self.request = None;
    }
}

/// Executes one RV32I integer operation.
pub fn execute(a: i32, b: i32, op: AluOp) -> i32 {
    let shamt = (b as u32) & 0x1F;
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Sll => ((a as u32) << shamt) as i32,
        AluOp::Srl => ((a as u32) >> shamt) as i32,
        AluOp::Sra => a >> shamt,
        AluOp::Slt => (a < b) as i32,
        AluOp::Sltu => ((a as u32) < (b as u32)) as i32,
    }
}
