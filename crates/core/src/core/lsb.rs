//! Load-Store Buffer (LSB): program-order memory unit.
//!
//! The LSB owns data memory and serializes every access. It provides:
//! 1. **Slot reservation:** Loads and stores get a placeholder entry at
//!    issue, so program order among memory operations is fixed before
//!    operands are known.
//! 2. **Head-only execution:** Each cycle only the oldest entry may make
//!    progress; an unresolved head stalls everything behind it, so nothing
//!    reorders past an unresolved address.
//! 3. **Store-at-commit:** Loads may execute speculatively, stores only
//!    after the ROB has committed them.
//! 4. **Fixed latency:** Every access occupies the head for a configurable
//!    number of cycles before the memory operation happens.
//!
//! Only load completions produce a CDB result; store completions are silent
//! because the ROB finished the store's register-level life at commit.

use crate::core::memory::Memory;
use crate::core::rob::RobTag;
use crate::isa::instruction::MemOp;

/// A single load-store buffer entry.
#[derive(Clone, Copy, Debug)]
pub struct LsbEntry {
    /// The memory operation.
    pub op: MemOp,
    /// Captured rs1 value (address base). Meaningless until `can_execute`.
    pub base: i32,
    /// Sign-extended address offset.
    pub imm: i32,
    /// Captured rs2 value for stores.
    pub data: i32,
    /// ROB tag a load result will carry on the CDB.
    pub dest_tag: RobTag,
    /// ROB id of the owning instruction; entries are ordered by this.
    pub rob_id: RobTag,
    /// Both operands captured; the entry may begin execution at the head.
    pub can_execute: bool,
    /// Execution in progress.
    pub executing: bool,
    /// Cycles left until the access completes.
    pub cycles_remaining: u32,
    /// The owning ROB entry has committed (always required for stores to
    /// touch memory).
    pub committed: bool,
}

/// A completed load, to be published on the common data bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LsbResult {
    pub dest_tag: RobTag,
    pub value: i32,
}

/// Load-store buffer, ordered by ROB id from head to tail.
pub struct LoadStoreBuffer {
    entries: Vec<LsbEntry>,
    capacity: usize,
    latency: u32,
    memory: Memory,
}

impl LoadStoreBuffer {
    /// Creates a buffer with the given capacity, per-access latency, and
    /// backing memory.
    pub fn new(capacity: usize, latency: u32, memory: Memory) -> Self {
        assert!(latency > 0, "memory latency must be positive");
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            latency,
            memory,
        }
    }

    /// Returns true if no further entries can be reserved.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Returns true if the buffer holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read access to the backing memory.
    #[inline]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Reserves or refreshes the entry for `rob_id`.
    ///
    /// The first call (at issue) creates a placeholder in program order; the
    /// dispatch stage then re-calls this each scan to refresh the captured
    /// operands, finally with `can_execute = true` once both are available.
    /// Duplicate calls never allocate a second entry.
    pub fn update(
        &mut self,
        rob_id: RobTag,
        op: MemOp,
        base: i32,
        imm: i32,
        data: i32,
        dest_tag: RobTag,
        can_execute: bool,
    ) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.rob_id == rob_id) {
            entry.base = base;
            entry.imm = imm;
            entry.data = data;
            entry.dest_tag = dest_tag;
            entry.can_execute = can_execute;
            return;
        }

        debug_assert!(!self.is_full());
        debug_assert!(self.entries.last().map_or(true, |e| e.rob_id < rob_id));
        self.entries.push(LsbEntry {
            op,
            base,
            imm,
            data,
            dest_tag,
            rob_id,
            can_execute,
            executing: false,
            cycles_remaining: 0,
            committed: false,
        });
    }

    /// Marks every entry with `rob_id` up to and including the argument as
    /// committed. Entries are in program order, so the sweep is safe; loads
    /// caught by it are unaffected (committed only gates stores).
    pub fn commit(&mut self, rob_id: RobTag) {
        for entry in self.entries.iter_mut() {
            if entry.rob_id <= rob_id {
                entry.committed = true;
            }
        }
    }

    /// Advances the buffer by one cycle.
    ///
    /// Only the head (oldest rob_id) makes progress. A head that cannot
    /// execute yet stalls the unit. Execution takes `latency` cycles; on
    /// completion the access is performed against memory and, for loads, the
    /// result is returned for CDB broadcast.
    pub fn tick(&mut self) -> Option<LsbResult> {
        let latency = self.latency;
        let head = self.entries.first_mut()?;

        if !head.can_execute && !head.executing {
            return None;
        }

        if !head.executing && head.can_execute && (head.op.is_load() || head.committed) {
            head.executing = true;
            head.cycles_remaining = latency;
        }

        if head.executing {
            head.cycles_remaining -= 1;
            if head.cycles_remaining == 0 {
                let entry = self.entries.remove(0);
                let addr = (entry.base as u32).wrapping_add(entry.imm as u32);
                return match entry.op {
                    MemOp::Load(op) => Some(LsbResult {
                        dest_tag: entry.dest_tag,
                        value: self.memory.load(addr, op),
                    }),
                    MemOp::Store(op) => {
                        self.memory.store(addr, entry.data, op);
                        None
                    }
                };
            }
        }
        None
    }

    /// Drops every non-committed entry.
    ///
    /// Committed entries are kept whether or not they have started
    /// executing: they are stores whose ROB entries already retired, so
    /// their memory effect is architectural and must still happen.
    pub fn flush(&mut self) {
        self.entries.retain(|e| e.committed);
    }
}
