//! Per-cycle processor orchestration.
//!
//! The processor owns every pipeline component and drives one cycle per
//! `step()` in four sub-phases:
//! 1. **Broadcast:** Each functional unit advances one cycle; results from
//!    work accepted in earlier cycles land on the common data bus and update
//!    the ROB and the reservation station.
//! 2. **Dispatch:** The reservation station is scanned head-first; ready
//!    entries move to their unit (at most one per unit per cycle). Loads and
//!    stores also refresh their load-store buffer slot while waiting.
//! 3. **Commit:** At most one ready ROB-head entry retires, updating the
//!    register file, notifying the LSB of store commits, or running
//!    misprediction recovery.
//! 4. **Fetch/Issue:** One instruction is fetched, decoded, and issued into
//!    ROB + RS unless a structural hazard or this cycle's recovery stalls
//!    the front end.
//!
//! Components never reference each other; every cross-component message
//! (CDB values, commit notifications, resolutions) flows through here.

use crate::common::abi;
use crate::common::SimError;
use crate::config::Config;
use crate::core::alu::Alu;
use crate::core::lsb::LoadStoreBuffer;
use crate::core::memory::Memory;
use crate::core::predictor::{BranchPredictor, ControlKind, PredictorRequest, PredictorResult};
use crate::core::regfile::RegisterFile;
use crate::core::rob::{ReorderBuffer, RobTag};
use crate::core::rs::{ReservationStation, RsEntry};
use crate::isa::instruction::{AluOp, IOp, Instruction, UpperOp};
use crate::isa::decode;
use crate::sim::ProgramImage;
use crate::stats::Stats;

/// What the commit stage did this cycle.
enum CommitOutcome {
    /// Nothing ready, or one entry retired normally.
    Continue,
    /// A misprediction was committed; the pipeline was flushed and fetch
    /// must stall for this cycle.
    Recovered,
    /// The termination sentinel committed with this exit value.
    Terminated(u8),
}

/// The simulated processor.
pub struct Processor {
    image: ProgramImage,
    regs: RegisterFile,
    rob: ReorderBuffer,
    rs: ReservationStation,
    lsb: LoadStoreBuffer,
    alu: Alu,
    predictor: BranchPredictor,
    pc: u32,
    cycle_limit: u64,
    trace: bool,
    /// Counters for reporting; never consulted by the pipeline itself.
    pub stats: Stats,
}

impl Processor {
    /// Creates a processor over a loaded program image. Data memory starts
    /// as a copy of the image; execution starts at PC 0.
    pub fn new(image: ProgramImage, config: &Config) -> Self {
        let memory = Memory::from_bytes(image.bytes().clone());
        Self {
            regs: RegisterFile::new(),
            rob: ReorderBuffer::new(config.rob_entries),
            rs: ReservationStation::new(config.rs_entries),
            lsb: LoadStoreBuffer::new(config.lsb_entries, config.mem_latency, memory),
            alu: Alu::new(),
            predictor: BranchPredictor::new(),
            pc: 0,
            cycle_limit: config.cycle_limit,
            trace: config.trace,
            stats: Stats::default(),
            image,
        }
    }

    /// Runs until the termination sentinel commits and returns
    /// `reg[a0] & 0xFF`. The cycle cap returns the same register-based value
    /// if the program never terminates.
    pub fn run(&mut self) -> Result<u8, SimError> {
        while self.stats.cycles < self.cycle_limit {
            if let Some(exit) = self.step()? {
                return Ok(exit);
            }
        }
        Ok((self.regs.read(abi::REG_A0) & 0xFF) as u8)
    }

    /// Advances the simulation by one cycle. Returns the exit value when the
    /// termination sentinel commits.
    pub fn step(&mut self) -> Result<Option<u8>, SimError> {
        self.stats.cycles += 1;

        self.broadcast();
        self.dispatch();
        match self.commit() {
            CommitOutcome::Terminated(value) => return Ok(Some(value)),
            CommitOutcome::Recovered => {} // fetch stalls this cycle
            CommitOutcome::Continue => self.fetch_issue()?,
        }
        Ok(None)
    }

    /// Current value of an architectural register.
    #[inline]
    pub fn register(&self, reg: usize) -> i32 {
        self.regs.read(reg)
    }

    /// Current program counter.
    #[inline]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Read access to data memory.
    #[inline]
    pub fn memory(&self) -> &Memory {
        self.lsb.memory()
    }

    /// Phase 1: tick every unit and deliver finished results to ROB and RS.
    fn broadcast(&mut self) {
        if let Some(result) = self.alu.tick() {
            self.publish(result.dest_tag, result.value);
        }
        if let Some(result) = self.predictor.tick() {
            self.resolve_control(result);
        }
        if let Some(result) = self.lsb.tick() {
            self.stats.loads += 1;
            self.publish(result.dest_tag, result.value);
        }
    }

    /// Places one (tag, value) pair on the common data bus.
    fn publish(&mut self, tag: RobTag, value: i32) {
        self.rob.record(tag, value);
        self.rs.on_cdb(tag, value);
    }

    /// Handles a predictor resolution: link-value broadcast for JAL/JALR and
    /// the branch-status update on the owning ROB entry.
    fn resolve_control(&mut self, result: PredictorResult) {
        self.stats.branches += 1;

        // Compare the resolved next PC against what fetch actually did.
        // A missing entry means the instruction was flushed; both records
        // below would be no-ops anyway.
        let mispredicted = match self.rob.speculative_next_pc(result.rob_id) {
            Some(speculated) => speculated != result.resolved_next_pc,
            None => return,
        };
        if mispredicted {
            self.stats.mispredictions += 1;
        }

        if let Some(dest_tag) = result.dest_tag {
            let link = result.pc.wrapping_add(4) as i32;
            self.publish(dest_tag, link);
        }
        self.rob
            .record_branch(result.rob_id, result.resolved_next_pc, mispredicted);
    }

    /// Phase 2: scan the reservation station head-first and hand ready
    /// entries to their functional units, one dispatch per unit per cycle.
    /// Loads and stores refresh their LSB slot on every scan so the buffer
    /// sees captured operands as soon as they arrive.
    fn dispatch(&mut self) {
        let mut lsb_fired = false;
        let mut idx = 0;

        while idx < self.rs.len() {
            let entry = match self.rs.get(idx) {
                Some(e) => *e,
                None => break,
            };
            let ready = entry.operands_ready();
            let mut dispatched = false;

            match entry.instr {
                Instruction::R { op, .. } => {
                    if ready && self.alu.is_free() {
                        self.alu.accept(entry.vj, entry.vk, op, entry.dest_tag);
                        dispatched = true;
                    }
                }
                Instruction::I { op: IOp::Arith(op), .. } => {
                    if ready && self.alu.is_free() {
                        self.alu.accept(entry.vj, entry.vk, op, entry.dest_tag);
                        dispatched = true;
                    }
                }
                Instruction::U { op, .. } => {
                    if ready && self.alu.is_free() {
                        // LUI adds the high-field immediate to zero, AUIPC to
                        // the fetch PC.
                        let base = match op {
                            UpperOp::Lui => 0,
                            UpperOp::Auipc => entry.pc_fetched as i32,
                        };
                        self.alu.accept(base, entry.vk, AluOp::Add, entry.dest_tag);
                        dispatched = true;
                    }
                }
                Instruction::B { op, .. } => {
                    if ready && self.predictor.is_free() {
                        self.predictor.accept(PredictorRequest {
                            pc: entry.pc_fetched,
                            rs1_val: entry.vj,
                            rs2_val: entry.vk,
                            imm: entry.imm,
                            kind: ControlKind::Branch(op),
                            rob_id: entry.dest_tag,
                            dest_tag: None,
                        });
                        dispatched = true;
                    }
                }
                Instruction::J { .. } => {
                    if ready && self.predictor.is_free() {
                        self.predictor.accept(PredictorRequest {
                            pc: entry.pc_fetched,
                            rs1_val: 0,
                            rs2_val: 0,
                            imm: entry.imm,
                            kind: ControlKind::Jal,
                            rob_id: entry.dest_tag,
                            dest_tag: Some(entry.dest_tag),
                        });
                        dispatched = true;
                    }
                }
                Instruction::I { op: IOp::Jalr, .. } => {
                    if ready && self.predictor.is_free() {
                        self.predictor.accept(PredictorRequest {
                            pc: entry.pc_fetched,
                            rs1_val: entry.vj,
                            rs2_val: 0,
                            imm: entry.imm,
                            kind: ControlKind::Jalr,
                            rob_id: entry.dest_tag,
                            dest_tag: Some(entry.dest_tag),
                        });
                        dispatched = true;
                    }
                }
                Instruction::I { op: IOp::Load(_), .. } | Instruction::S { .. } => {
                    // The LSB slot was reserved at issue; keep its payload
                    // fresh and release it for execution once both operands
                    // are captured.
                    let fire = ready && !lsb_fired;
                    if let Some(op) = entry.instr.mem_op() {
                        self.lsb.update(
                            entry.dest_tag,
                            op,
                            entry.vj,
                            entry.imm,
                            entry.vk,
                            entry.dest_tag,
                            fire,
                        );
                    }
                    if fire {
                        dispatched = true;
                        lsb_fired = true;
                    }
                }
                Instruction::Invalid => {
                    // Never issued; nothing to dispatch.
                }
            }

            if dispatched {
                self.rs.remove(idx);
            } else {
                idx += 1;
            }
        }
    }

    /// Phase 3: retire at most one ready entry from the ROB head.
    fn commit(&mut self) -> CommitOutcome {
        let head = match self.rob.peek_head() {
            Some(h) if h.ready => *h,
            _ => return CommitOutcome::Continue,
        };

        if is_termination(&head.instr) {
            let exit = (self.regs.read(abi::REG_A0) & 0xFF) as u8;
            self.regs.clear_tag_if_match(abi::REG_A0, head.id);
            self.rob.pop_head();
            self.stats.committed += 1;
            if self.trace {
                eprintln!("CM  pc={:#x} rob={} halt exit={}", head.pc_fetched, head.id.0, exit);
            }
            return CommitOutcome::Terminated(exit);
        }

        // The destination write happens even for a mispredicted JALR: the
        // jump itself is architectural, only the instructions fetched after
        // it are squashed.
        if let Some(rd) = head.dest_reg {
            self.regs.write(rd, head.value);
            self.regs.clear_tag_if_match(rd, head.id);
        }
        if head.instr.is_store() {
            self.lsb.commit(head.id);
            self.stats.stores += 1;
        }
        self.rob.pop_head();
        self.stats.committed += 1;
        if self.trace {
            eprintln!("CM  pc={:#x} rob={} {}", head.pc_fetched, head.id.0, head.instr);
        }

        if head.mispredicted {
            self.recover(head.corrected_pc);
            return CommitOutcome::Recovered;
        }
        CommitOutcome::Continue
    }

    /// Misprediction recovery: squash all speculative state and redirect.
    fn recover(&mut self, corrected_pc: u32) {
        self.rob.flush(&mut self.regs);
        self.rs.flush();
        self.lsb.flush();
        self.alu.flush();
        self.predictor.flush();
        // Every surviving tag pointed at a flushed entry.
        self.regs.clear_tags();
        self.pc = corrected_pc;
        self.stats.flushes += 1;
        if self.trace {
            eprintln!("RC  flush, resume pc={:#x}", corrected_pc);
        }
    }

    /// Phase 4: fetch, decode, and issue one instruction.
    fn fetch_issue(&mut self) -> Result<(), SimError> {
        if self.rob.is_full() || self.rs.is_full() {
            return Ok(()); // structural stall; retry next cycle
        }

        let pc = self.pc;
        let word = match self.image.fetch_word(pc) {
            Some(word) => word,
            None => return self.fetch_fault(0),
        };
        let instr = decode(word);
        if instr == Instruction::Invalid {
            return self.fetch_fault(word);
        }
        if instr.mem_op().is_some() && self.lsb.is_full() {
            return Ok(());
        }

        // Speculative next PC: conditional branches follow the predictor,
        // JAL is unconditional, JALR falls through until resolution.
        let next_pc = match instr {
            Instruction::B { imm, .. } => {
                if self.predictor.predict_taken() {
                    pc.wrapping_add(imm as u32)
                } else {
                    pc.wrapping_add(4)
                }
            }
            Instruction::J { imm, .. } => pc.wrapping_add(imm as u32),
            _ => pc.wrapping_add(4),
        };

        let dest_reg = instr.dest_reg();
        let id = match self.rob.issue(instr, dest_reg, pc, next_pc) {
            Some(id) => id,
            None => return Ok(()),
        };

        // Capture operands, forwarding from completed ROB entries. Formats
        // without a second source carry the immediate in the k slot.
        let (vj, qj) = match instr.src1() {
            Some(reg) => self.read_operand(reg),
            None => (0, None),
        };
        let imm = instr.imm().unwrap_or(0);
        let (vk, qk) = match instr.src2() {
            Some(reg) => self.read_operand(reg),
            None => (imm, None),
        };

        self.rs.push(RsEntry {
            instr,
            vj,
            vk,
            qj,
            qk,
            imm,
            dest_tag: id,
            pc_fetched: pc,
        });

        // Loads and stores reserve their program-order LSB slot now.
        if let Some(op) = instr.mem_op() {
            self.lsb.update(id, op, vj, imm, vk, id, false);
        }

        if let Some(rd) = dest_reg {
            self.regs.set_tag(rd, id);
        }

        self.pc = next_pc;
        if self.trace {
            eprintln!("IS  pc={:#x} rob={} {}", pc, id.0, instr);
        }
        Ok(())
    }

    /// An unfetchable or undecodable word at the current PC.
    ///
    /// While instructions are in flight this is a routine wrong-path stall:
    /// the PC holds and a pending misprediction recovery will redirect it.
    /// With an empty ROB no redirect can ever arrive, so it is fatal.
    fn fetch_fault(&self, word: u32) -> Result<(), SimError> {
        if self.rob.is_empty() {
            return Err(SimError::InvalidInstruction { pc: self.pc, word });
        }
        Ok(())
    }

    /// Reads one source operand: the architectural value when no producer is
    /// pending, a forwarded ROB value when the producer already completed,
    /// or the producer's tag otherwise.
    fn read_operand(&self, reg: usize) -> (i32, Option<RobTag>) {
        match self.regs.tag(reg) {
            None => (self.regs.read(reg), None),
            Some(tag) => match self.rob.get_value(tag) {
                Some(value) => (value, None),
                None => (0, Some(tag)),
            },
        }
    }
}

/// The termination sentinel: `ADDI x10, x0, 255`.
fn is_termination(instr: &Instruction) -> bool {
    matches!(
        instr,
        Instruction::I {
            op: IOp::Arith(AluOp::Add),
            rd: 10,
            rs1: 0,
            imm: 255,
        }
    )
}
