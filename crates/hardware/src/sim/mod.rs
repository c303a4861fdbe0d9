//! Simulation driver.
//!
//! Owns the cores, their contexts, data memory and the instruction stream, and
//! advances them cycle by cycle.

/// Multi-core simulator shell.
pub mod simulator;

pub use simulator::{RunSummary, Simulator};
