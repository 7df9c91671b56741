//! Common types shared across the simulator.

/// ABI register indices.
pub mod abi;
/// Simulator error definitions.
pub mod error;

pub use error::SimError;
