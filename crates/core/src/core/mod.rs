//! Processor core: pipeline components and per-cycle orchestration.

/// Single-cycle integer ALU with a one-entry pipeline register.
pub mod alu;
/// Ordered memory unit enforcing store-at-commit.
pub mod lsb;
/// Byte-addressed little-endian data memory.
pub mod memory;
/// Two-bit saturating branch predictor and target resolution.
pub mod predictor;
/// Per-cycle orchestration: broadcast, dispatch, commit, fetch/issue.
pub mod processor;
/// Architectural register file with per-register pending tags.
pub mod regfile;
/// Reorder buffer: in-order commit and tag-addressed forwarding.
pub mod rob;
/// Reservation station: operand capture and dispatch.
pub mod rs;

pub use processor::Processor;
pub use rob::RobTag;
