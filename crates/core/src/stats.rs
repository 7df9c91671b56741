//! Simulation statistics.
//!
//! Plain counters collected by the processor. Reporting goes to stderr so
//! stdout stays reserved for the program's exit value.

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    /// Cycles simulated.
    pub cycles: u64,
    /// Instructions committed.
    pub committed: u64,
    /// Control instructions resolved (branches and jumps).
    pub branches: u64,
    /// Resolutions that disagreed with the fetch-time speculation.
    pub mispredictions: u64,
    /// Loads completed.
    pub loads: u64,
    /// Stores committed.
    pub stores: u64,
    /// Pipeline flushes performed during recovery.
    pub flushes: u64,
}

impl Stats {
    /// Prints a summary to stderr.
    pub fn print(&self) {
        eprintln!("cycles:         {}", self.cycles);
        eprintln!("committed:      {}", self.committed);
        if self.committed > 0 {
            eprintln!("ipc:            {:.3}", self.committed as f64 / self.cycles as f64);
        }
        eprintln!("branches:       {}", self.branches);
        eprintln!("mispredictions: {}", self.mispredictions);
        eprintln!("loads:          {}", self.loads);
        eprintln!("stores:         {}", self.stores);
        eprintln!("flushes:        {}", self.flushes);
    }
}
