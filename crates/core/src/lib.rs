//! RV32I out-of-order simulator library.
//!
//! This crate implements a cycle-accurate RV32I simulator built around
//! Tomasulo's algorithm with the following:
//! 1. **Core:** Reorder buffer, reservation station, load-store buffer, ALU,
//!    branch predictor, and architectural register file.
//! 2. **ISA:** RV32I decoding into a tagged instruction enum.
//! 3. **Simulation:** Text-image loader, per-cycle processor orchestration,
//!    and statistics collection.
//!
//! The processor runs a program image cycle by cycle and returns the low
//! eight bits of register `a0` when the termination sentinel
//! (`ADDI x10, x0, 255`) commits.

/// Common types (errors, ABI register indices).
pub mod common;
/// Simulator configuration (defaults, capacities, latencies).
pub mod config;
/// Processor core (pipeline components and per-cycle orchestration).
pub mod core;
/// Instruction set (opcodes, instruction enum, decoder).
pub mod isa;
/// Program image loader.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main processor type; owns every pipeline component.
pub use crate::core::Processor;
