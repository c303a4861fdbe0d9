//! Core processor implementation.
//!
//! This module contains the SMT core: the per-thread contexts, the resources
//! they share, the speculative pipeline and the predictor and execution units
//! the pipeline draws on.

/// Per-thread context state.
pub mod context;

/// Speculative out-of-order pipeline (buffers, renaming, rollback, stages).
pub mod pipeline;

/// SMT core resource composition and context migration.
pub mod smt;

/// Return-address stack and functional-unit pool.
pub mod units;

pub use self::context::{Context, ContextId, RunState};
pub use self::smt::{Core, SlotId, transfer_context};
