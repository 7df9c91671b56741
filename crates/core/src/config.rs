//! Configuration for the simulator.
//!
//! This module defines the configuration structure used to parameterize the
//! simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (buffer capacities, memory
//!    latency, cycle cap).
//! 2. **Structure:** A flat config deserializable from JSON via `serde_json`
//!    (CLI `--config`), or `Config::default()` when none is supplied.

use serde::Deserialize;

/// Default configuration constants for the simulator.
mod defaults {
    /// Reorder buffer capacity in entries.
    ///
    /// Bounds the number of in-flight instructions; tags are ROB ids.
    pub const ROB_ENTRIES: usize = 32;

    /// Reservation station capacity in entries.
    pub const RS_ENTRIES: usize = 32;

    /// Load-store buffer capacity in entries.
    pub const LSB_ENTRIES: usize = 32;

    /// Memory access latency in cycles.
    ///
    /// Every load and store occupies the load-store buffer head for this
    /// many cycles before its access completes.
    pub const MEM_LATENCY: u32 = 3;

    /// Runaway safety cap on simulated cycles.
    ///
    /// If the program has not committed the termination sentinel by this
    /// point, the simulator gives up and reports the current `a0` value.
    pub const CYCLE_LIMIT: u64 = 2_000_000_000;
}

/// Simulator configuration.
///
/// # Examples
///
/// ```
/// use rv32_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.rob_entries, 32);
/// assert_eq!(config.mem_latency, 3);
///
/// let json = r#"{ "mem_latency": 1, "trace": true }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.mem_latency, 1);
/// assert!(config.trace);
/// assert_eq!(config.lsb_entries, 32);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Reorder buffer capacity.
    #[serde(default = "Config::default_rob_entries")]
    pub rob_entries: usize,

    /// Reservation station capacity.
    #[serde(default = "Config::default_rs_entries")]
    pub rs_entries: usize,

    /// Load-store buffer capacity.
    #[serde(default = "Config::default_lsb_entries")]
    pub lsb_entries: usize,

    /// Memory access latency in cycles. Must be a positive integer.
    #[serde(default = "Config::default_mem_latency")]
    pub mem_latency: u32,

    /// Safety cap on simulated cycles.
    #[serde(default = "Config::default_cycle_limit")]
    pub cycle_limit: u64,

    /// Enable per-stage tracing to stderr.
    #[serde(default)]
    pub trace: bool,
}

impl Config {
    fn default_rob_entries() -> usize {
        defaults::ROB_ENTRIES
    }

    fn default_rs_entries() -> usize {
        defaults::RS_ENTRIES
    }

    fn default_lsb_entries() -> usize {
        defaults::LSB_ENTRIES
    }

    fn default_mem_latency() -> u32 {
        defaults::MEM_LATENCY
    }

    fn default_cycle_limit() -> u64 {
        defaults::CYCLE_LIMIT
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rob_entries: defaults::ROB_ENTRIES,
            rs_entries: defaults::RS_ENTRIES,
            lsb_entries: defaults::LSB_ENTRIES,
            mem_latency: defaults::MEM_LATENCY,
            cycle_limit: defaults::CYCLE_LIMIT,
            trace: false,
        }
    }
}
