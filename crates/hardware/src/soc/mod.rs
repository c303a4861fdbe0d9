//! Memory-side collaborators of the core.
//!
//! The engine reaches memory through two traits: `Memory` for functional
//! loads, stores and store-shadow replay, and `LatencyOracle` for timing.

/// Data memory and latency oracles.
pub mod memory;

pub use memory::controller::{FixedLatency, LatencyOracle};
pub use memory::{FlatMemory, MemCmd, Memory};
