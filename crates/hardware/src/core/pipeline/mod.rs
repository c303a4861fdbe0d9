//! Speculative out-of-order pipeline.
//!
//! This module contains the structures and stages of the execution engine:
//! 1. **Registers:** Shared physical register file and per-context renaming.
//! 2. **Buffers:** ROB/LSQ entry arena, fetch queue and shared issue queue.
//! 3. **Scheduling:** Wakeup queues ordered by cycle or sequence number.
//! 4. **Rollback:** Squash and flush of speculative state.
//! 5. **Stages:** Fetch, dispatch, issue, writeback and commit, driven by the engine.

/// Circular entry arena backing the ROB and the LSQ.
pub mod buffer;

/// Per-cycle driver of a context's stages.
pub mod engine;

/// In-flight instruction record.
pub mod entry;

/// Instruction fetch queue.
pub mod fetch_queue;

/// Shared issue-queue slot allocator.
pub mod issue_queue;

/// Physical register file.
pub mod regfile;

/// Rename table and destination allocation.
pub mod rename;

/// Flush and rollback controller.
pub mod rollback;

/// Pipeline stage implementations.
pub mod stages;

/// Waiting, issue, event and ready queues.
pub mod wakeup;

pub use engine::{ExecEnv, tick_context};
pub use rollback::{RollbackKind, SquashReport, flush_context, rollback_to};
