//! Speculative execution engine of an SMT out-of-order core.
//!
//! This crate implements a cycle-level simulator of superscalar,
//! simultaneously multithreaded cores with the following:
//! 1. **Core:** ROB, LSQ, physical register renaming, wakeup queues and the rollback controller.
//! 2. **SMT:** Context admission, eviction and migration across cores sharing nothing but memory.
//! 3. **ISA:** A small load/store instruction set executed functionally at dispatch.
//! 4. **Memory:** Flat data memory and a pluggable access-latency model.
//! 5. **Simulation:** Configuration, statistics and a multi-core driver.

/// Common types and constants (register names, errors, stall signals).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// SMT core (contexts, shared resources, pipeline, units).
pub mod core;
/// Instruction set (opcodes, classification, functional semantics, programs).
pub mod isa;
/// Multi-core simulator driver.
pub mod sim;
/// Data memory and latency models.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or parse with `Config::from_json`.
pub use crate::config::Config;
/// SMT core and per-thread context.
pub use crate::core::{Context, ContextId, Core, RunState, transfer_context};
/// Rollback entry points.
pub use crate::core::pipeline::{RollbackKind, SquashReport, flush_context, rollback_to};
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::Simulator;
