//! Branch predictor and control-flow resolution unit.
//!
//! A single 2-bit saturating counter drives direction prediction for
//! conditional branches; the unit also resolves targets for every control
//! instruction. It provides:
//! 1. **Prediction:** `predict_taken` is consulted by the fetch stage when a
//!    conditional branch issues.
//! 2. **Resolution:** A dispatched request is latched for one cycle; the
//!    next tick computes the actual direction, the target, and the resolved
//!    next PC, then frees the unit.
//! 3. **Training:** The counter moves one step per conditional-branch
//!    outcome; jumps do not touch it.

use crate::core::rob::RobTag;
use crate::isa::instruction::BranchOp;

/// Two-bit saturating counter state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterState {
    StrongTaken,
    WeakTaken,
    WeakNotTaken,
    StrongNotTaken,
}

/// Which control instruction a request resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    /// Conditional branch comparing two register operands.
    Branch(BranchOp),
    /// Unconditional jump, target `pc + imm`.
    Jal,
    /// Register-indirect jump, target `(rs1 + imm) & !1`.
    Jalr,
}

/// A control instruction handed over by dispatch.
#[derive(Clone, Copy, Debug)]
pub struct PredictorRequest {
    /// Fetch address of the instruction.
    pub pc: u32,
    /// Captured rs1 value (branch comparison / JALR base).
    pub rs1_val: i32,
    /// Captured rs2 value (branch comparison).
    pub rs2_val: i32,
    /// Sign-extended offset.
    pub imm: i32,
    /// What to resolve.
    pub kind: ControlKind,
    /// ROB id of the owning instruction.
    pub rob_id: RobTag,
    /// ROB tag to carry the link value, for JAL/JALR.
    pub dest_tag: Option<RobTag>,
}

/// The outcome of resolving a control instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictorResult {
    /// ROB id of the resolved instruction.
    pub rob_id: RobTag,
    /// Link-value destination, for JAL/JALR.
    pub dest_tag: Option<RobTag>,
    /// Fetch address of the instruction.
    pub pc: u32,
    /// Whether the branch is actually taken (always true for jumps).
    pub taken: bool,
    /// Resolved target address.
    pub target_pc: u32,
    /// The architecturally correct next PC: `target_pc` if taken, `pc + 4`
    /// otherwise. Compared against the fetch-time speculation to detect
    /// mispredictions.
    pub resolved_next_pc: u32,
}

/// Branch predictor with a one-entry request pipeline.
pub struct BranchPredictor {
    state: CounterState,
    request: Option<PredictorRequest>,
}

impl Default for BranchPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchPredictor {
    /// Creates a predictor in the weakly-not-taken state.
    pub fn new() -> Self {
        Self {
            state: CounterState::WeakNotTaken,
            request: None,
        }
    }

    /// Current counter state (observable for tests and tracing).
    #[inline]
    pub fn state(&self) -> CounterState {
        self.state
    }

    /// Direction the counter currently predicts for a conditional branch.
    #[inline]
    pub fn predict_taken(&self) -> bool {
        matches!(self.state, CounterState::StrongTaken | CounterState::WeakTaken)
    }

    /// Returns true if the unit can accept a request this cycle.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.request.is_none()
    }

    /// Latches a control instruction for resolution next tick. The caller
    /// must check [`BranchPredictor::is_free`] first.
    pub fn accept(&mut self, request: PredictorRequest) {
        debug_assert!(self.is_free());
        self.request = Some(request);
    }

    /// Advances one cycle: resolves the latched request, trains the counter
    /// on conditional-branch outcomes, and frees the unit.
    pub fn tick(&mut self) -> Option<PredictorResult> {
        let req = self.request.take()?;

        let taken = match req.kind {
            ControlKind::Jal | ControlKind::Jalr => true,
            ControlKind::Branch(op) => evaluate(op, req.rs1_val, req.rs2_val),
        };

        let target_pc = match req.kind {
            ControlKind::Jalr => (req.rs1_val.wrapping_add(req.imm) as u32) & !1,
            _ => req.pc.wrapping_add(req.imm as u32),
        };

        if let ControlKind::Branch(_) = req.kind {
            self.train(taken);
        }

        Some(PredictorResult {
            rob_id: req.rob_id,
            dest_tag: req.dest_tag,
            pc: req.pc,
            taken,
            target_pc,
            resolved_next_pc: if taken { target_pc } else { req.pc.wrapping_add(4) },
        })
    }

    /// Cancels any latched request (misprediction recovery). The counter
    /// state survives: training that already happened is architectural
    /// history.
    pub fn flush(&mut self) {
        self.request = None;
    }

    /// Moves the saturating counter one step toward the observed outcome.
    fn train(&mut self, taken: bool) {
        use CounterState::*;
        self.state = match (self.state, taken) {
            (StrongTaken, true) => StrongTaken,
            (StrongTaken, false) => WeakTaken,
            (WeakTaken, true) => StrongTaken,
            (WeakTaken, false) => WeakNotTaken,
            (WeakNotTaken, true) => WeakTaken,
            (WeakNotTaken, false) => StrongNotTaken,
            (StrongNotTaken, true) => WeakNotTaken,
            (StrongNotTaken, false) => StrongNotTaken,
        };
    }
}

/// Evaluates a conditional branch on captured operand values.
fn evaluate(op: BranchOp, rs1: i32, rs2: i32) -> bool {
    match op {
        BranchOp::Beq => rs1 == rs2,
        BranchOp::Bne => rs1 != rs2,
        BranchOp::Blt => rs1 < rs2,
        BranchOp::Bge => rs1 >= rs2,
        BranchOp::Bltu => (rs1 as u32) < (rs2 as u32),
        BranchOp::Bgeu => (rs1 as u32) >= (rs2 as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch_request(op: BranchOp, rs1: i32, rs2: i32) -> PredictorRequest {
        PredictorRequest {
            pc: 0x100,
            rs1_val: rs1,
            rs2_val: rs2,
            imm: 16,
            kind: ControlKind::Branch(op),
            rob_id: RobTag(1),
            dest_tag: None,
        }
    }

    #[test]
    fn test_initial_state_predicts_not_taken() {
        let bp = BranchPredictor::new();
        assert_eq!(bp.state(), CounterState::WeakNotTaken);
        assert!(!bp.predict_taken());
    }

    #[test]
    fn test_four_taken_outcomes_saturate() {
        let mut bp = BranchPredictor::new();
        for _ in 0..4 {
            bp.accept(branch_request(BranchOp::Beq, 1, 1));
            bp.tick();
        }
        assert_eq!(bp.state(), CounterState::StrongTaken);
        // Saturated: further taken outcomes keep it there
        bp.accept(branch_request(BranchOp::Beq, 1, 1));
        bp.tick();
        assert_eq!(bp.state(), CounterState::StrongTaken);
    }

    #[test]
    fn test_counter_steps_one_at_a_time() {
        let mut bp = BranchPredictor::new();
        bp.accept(branch_request(BranchOp::Beq, 1, 1));
        bp.tick();
        assert_eq!(bp.state(), CounterState::WeakTaken);
        assert!(bp.predict_taken());

        bp.accept(branch_request(BranchOp::Beq, 1, 2));
        bp.tick();
        assert_eq!(bp.state(), CounterState::WeakNotTaken);
    }

    #[test]
    fn test_result_one_cycle_later() {
        let mut bp = BranchPredictor::new();
        assert_eq!(bp.tick(), None);
        bp.accept(branch_request(BranchOp::Bne, 3, 4));
        assert!(!bp.is_free());
        let result = bp.tick().unwrap();
        assert!(result.taken);
        assert_eq!(result.target_pc, 0x110);
        assert_eq!(result.resolved_next_pc, 0x110);
        assert!(bp.is_free());
    }

    #[test]
    fn test_not_taken_resolves_fall_through() {
        let mut bp = BranchPredictor::new();
        bp.accept(branch_request(BranchOp::Beq, 1, 2));
        let result = bp.tick().unwrap();
        assert!(!result.taken);
        assert_eq!(result.resolved_next_pc, 0x104);
    }

    #[test]
    fn test_branch_comparisons() {
        assert!(evaluate(BranchOp::Beq, 5, 5));
        assert!(evaluate(BranchOp::Bne, 5, 6));
        assert!(evaluate(BranchOp::Blt, -1, 0));
        assert!(evaluate(BranchOp::Bge, 0, -1));
        // Unsigned: -1 is the largest u32
        assert!(!evaluate(BranchOp::Bltu, -1, 0));
        assert!(evaluate(BranchOp::Bgeu, -1, 0));
    }

    #[test]
    fn test_jal_always_taken_no_training() {
        let mut bp = BranchPredictor::new();
        bp.accept(PredictorRequest {
            pc: 0x200,
            rs1_val: 0,
            rs2_val: 0,
            imm: 8,
            kind: ControlKind::Jal,
            rob_id: RobTag(2),
            dest_tag: Some(RobTag(2)),
        });
        let result = bp.tick().unwrap();
        assert!(result.taken);
        assert_eq!(result.target_pc, 0x208);
        assert_eq!(bp.state(), CounterState::WeakNotTaken);
    }

    #[test]
    fn test_jalr_target_clears_low_bit() {
        let mut bp = BranchPredictor::new();
        bp.accept(PredictorRequest {
            pc: 0x200,
            rs1_val: 0x301,
            rs2_val: 0,
            imm: 2,
            kind: ControlKind::Jalr,
            rob_id: RobTag(3),
            dest_tag: Some(RobTag(3)),
        });
        let result = bp.tick().unwrap();
        assert_eq!(result.target_pc, 0x302);
    }

    #[test]
    fn test_flush_cancels_request_keeps_state() {
        let mut bp = BranchPredictor::new();
        bp.accept(branch_request(BranchOp::Beq, 1, 1));
        bp.tick();
        assert_eq!(bp.state(), CounterState::WeakTaken);

        bp.accept(branch_request(BranchOp::Beq, 1, 1));
        bp.flush();
        assert!(bp.is_free());
        assert_eq!(bp.tick(), None);
        assert_eq!(bp.state(), CounterState::WeakTaken);
    }
}
