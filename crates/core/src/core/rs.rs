//! Reservation Station (RS) for operand capture.
//!
//! Issued instructions wait here until both source operands are available.
//! Operands are captured at issue time (from the register file or a
//! completed ROB entry) or arrive later over the common data bus. The
//! dispatch stage scans entries head-first, oldest first, and removes an
//! entry when it is handed to its functional unit.

use std::collections::VecDeque;

use crate::core::rob::RobTag;
use crate::isa::Instruction;

/// A single reservation station entry.
///
/// `vj`/`vk` are meaningful only while the matching `qj`/`qk` is `None`;
/// a pending tag means the operand is still in flight. For instructions
/// without a real second source, `vk` holds the sign-extended immediate so
/// the ALU path needs no special casing; the raw immediate is additionally
/// kept in `imm` for address and target computation.
#[derive(Clone, Copy, Debug)]
pub struct RsEntry {
    /// The decoded instruction.
    pub instr: Instruction,
    /// First operand value (valid when `qj` is `None`).
    pub vj: i32,
    /// Second operand value or immediate (valid when `qk` is `None`).
    pub vk: i32,
    /// Pending producer of the first operand.
    pub qj: Option<RobTag>,
    /// Pending producer of the second operand.
    pub qk: Option<RobTag>,
    /// Sign-extended immediate (offset for memory and control flow).
    pub imm: i32,
    /// ROB tag this instruction's result will carry.
    pub dest_tag: RobTag,
    /// Address the instruction was fetched from.
    pub pc_fetched: u32,
}

impl RsEntry {
    /// True when both operands are captured and the entry may dispatch.
    #[inline]
    pub fn operands_ready(&self) -> bool {
        self.qj.is_none() && self.qk.is_none()
    }
}

/// Reservation station — issue-ordered queue of waiting instructions.
pub struct ReservationStation {
    entries: VecDeque<RsEntry>,
    capacity: usize,
}

impl ReservationStation {
    /// Creates a reservation station with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the number of waiting entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the station is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Adds an entry. The caller checks fullness first; issue stalls on a
    /// full station.
    pub fn push(&mut self, entry: RsEntry) {
        debug_assert!(!self.is_full());
        self.entries.push_back(entry);
    }

    /// Returns the entry at queue position `idx` (0 = oldest).
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&RsEntry> {
        self.entries.get(idx)
    }

    /// Removes and returns the entry at queue position `idx`.
    pub fn remove(&mut self, idx: usize) -> Option<RsEntry> {
        self.entries.remove(idx)
    }

    /// Delivers a CDB broadcast: every entry waiting on `tag` captures the
    /// value and clears the matching pending slot.
    pub fn on_cdb(&mut self, tag: RobTag, value: i32) {
        for entry in self.entries.iter_mut() {
            if entry.qj == Some(tag) {
                entry.vj = value;
                entry.qj = None;
            }
            if entry.qk == Some(tag) {
                entry.vk = value;
                entry.qk = None;
            }
        }
    }

    /// Drops every entry.
    pub fn flush(&mut self) {
        self.entries.clear();
    }
}
