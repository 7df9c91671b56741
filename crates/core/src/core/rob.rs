//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a circular buffer tracking every in-flight instruction from
//! issue through commit. It provides:
//! 1. **Allocation:** Assigns a unique, monotonically increasing tag to each
//!    issued instruction.
//! 2. **Completion:** Records CDB values and branch resolutions against
//!    entries by tag.
//! 3. **In-order commit:** The head entry is the only one eligible to
//!    retire.
//! 4. **Forwarding:** `get_value` lets the issue stage read results of
//!    completed but uncommitted producers.
//! 5. **Flush:** Squashes all entries after a misprediction, releasing any
//!    register tags they hold.

use crate::core::regfile::RegisterFile;
use crate::isa::Instruction;

/// Unique tag identifying an in-flight instruction in the ROB.
///
/// Tags are never reused within a run (the cycle cap keeps the counter well
/// below `u32::MAX`), so numeric order is program order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RobTag(pub u32);

/// A single entry in the reorder buffer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RobEntry {
    /// Unique tag for this entry.
    pub id: RobTag,
    /// The decoded instruction.
    pub instr: Instruction,
    /// Address the instruction was fetched from.
    pub pc_fetched: u32,
    /// The next PC the fetch stage actually continued at after this
    /// instruction. Branch resolution compares against this.
    pub speculative_next_pc: u32,
    /// Destination register, if the instruction writes one.
    pub dest_reg: Option<usize>,
    /// Result value (ALU output, load data, or link address).
    pub value: i32,
    /// Execution complete; the entry may commit when it reaches the head.
    pub ready: bool,
    /// The speculative path taken at fetch was wrong; committing this entry
    /// triggers recovery.
    pub mispredicted: bool,
    /// PC to resume at when `mispredicted` (the resolved next PC otherwise).
    pub corrected_pc: u32,
    /// Whether this slot is occupied.
    valid: bool,
}

/// Reorder buffer — circular FIFO of in-flight instructions.
pub struct ReorderBuffer {
    entries: Vec<RobEntry>,
    /// Index of the oldest entry (commit point).
    head: usize,
    /// Index where the next entry will be allocated.
    tail: usize,
    /// Number of valid entries.
    count: usize,
    /// Monotonically increasing tag counter; never reset, not even by flush.
    next_id: u32,
}

impl ReorderBuffer {
    /// Creates a new ROB with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, RobEntry::default);
        Self {
            entries,
            head: 0,
            tail: 0,
            count: 0,
            next_id: 0,
        }
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the ROB is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the ROB is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Allocates an entry for an issued instruction. Returns `None` when the
    /// buffer is full (a structural stall, not an error).
    ///
    /// Entries start not-ready except for instructions with no destination
    /// that are not conditional branches (stores): those have nothing to wait
    /// for at the register level and become eligible to commit immediately;
    /// the load-store buffer serializes their actual memory effect.
    pub fn issue(
        &mut self,
        instr: Instruction,
        dest_reg: Option<usize>,
        pc_fetched: u32,
        speculative_next_pc: u32,
    ) -> Option<RobTag> {
        if self.is_full() {
            return None;
        }

        let id = RobTag(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let ready = dest_reg.is_none() && !instr.is_branch();
        self.entries[self.tail] = RobEntry {
            id,
            instr,
            pc_fetched,
            speculative_next_pc,
            dest_reg,
            value: 0,
            ready,
            mispredicted: false,
            corrected_pc: speculative_next_pc,
            valid: true,
        };

        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Some(id)
    }

    /// Records a CDB value against an entry and marks it ready.
    ///
    /// A missing tag is a no-op: the entry was flushed after the producing
    /// unit started working.
    pub fn record(&mut self, tag: RobTag, value: i32) {
        if let Some(entry) = self.find_entry_mut(tag) {
            entry.value = value;
            entry.ready = true;
        }
    }

    /// Records a branch resolution: the corrected PC, whether the fetch-time
    /// speculation was wrong, and readiness to commit. No-op if flushed.
    pub fn record_branch(&mut self, tag: RobTag, corrected_pc: u32, mispredicted: bool) {
        if let Some(entry) = self.find_entry_mut(tag) {
            entry.corrected_pc = corrected_pc;
            entry.mispredicted = mispredicted;
            entry.ready = true;
        }
    }

    /// Returns the next PC that fetch speculatively continued at after the
    /// tagged instruction, if the entry still exists.
    pub fn speculative_next_pc(&self, tag: RobTag) -> Option<u32> {
        self.find_entry(tag).map(|e| e.speculative_next_pc)
    }

    /// Returns a completed entry's value by tag, for operand forwarding at
    /// issue. `None` if the entry is missing or not yet ready.
    pub fn get_value(&self, tag: RobTag) -> Option<i32> {
        match self.find_entry(tag) {
            Some(entry) if entry.ready => Some(entry.value),
            _ => None,
        }
    }

    /// Returns the head (oldest) entry, if any.
    pub fn peek_head(&self) -> Option<&RobEntry> {
        if self.count == 0 {
            None
        } else {
            Some(&self.entries[self.head])
        }
    }

    /// Removes and returns the head entry.
    pub fn pop_head(&mut self) -> Option<RobEntry> {
        if self.count == 0 {
            return None;
        }
        let entry = self.entries[self.head];
        self.entries[self.head].valid = false;
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        Some(entry)
    }

    /// Drops every entry, releasing the register tags they still hold.
    ///
    /// The tag counter keeps running so post-flush allocations stay ordered
    /// after everything that came before.
    pub fn flush(&mut self, regs: &mut RegisterFile) {
        let mut idx = self.head;
        for _ in 0..self.count {
            let entry = &mut self.entries[idx];
            if entry.valid {
                if let Some(rd) = entry.dest_reg {
                    regs.clear_tag_if_match(rd, entry.id);
                }
                entry.valid = false;
            }
            idx = (idx + 1) % self.entries.len();
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    fn find_entry(&self, tag: RobTag) -> Option<&RobEntry> {
        let mut idx = self.head;
        for _ in 0..self.count {
            if self.entries[idx].valid && self.entries[idx].id == tag {
                return Some(&self.entries[idx]);
            }
            idx = (idx + 1) % self.entries.len();
        }
        None
    }

    fn find_entry_mut(&mut self, tag: RobTag) -> Option<&mut RobEntry> {
        let mut idx = self.head;
        for _ in 0..self.count {
            if self.entries[idx].valid && self.entries[idx].id == tag {
                return Some(&mut self.entries[idx]);
            }
            idx = (idx + 1) % self.entries.len();
        }
        None
    }
}
