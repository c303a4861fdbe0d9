//! Per-cycle driver of one context's pipeline.
//!
//! Stages run in reverse pipeline order so that each stage sees the state the
//! younger stages left at the end of the previous cycle:
//! 1. **Commit:** Retires completed entries from the ROB head.
//! 2. **Writeback:** Completes entries whose execution finishes this cycle.
//! 3. **Issue:** Wakes waiting entries and grants functional units.
//! 4. **Dispatch:** Renames, executes functionally and enqueues.
//! 5. **Fetch:** Predicts and fills the fetch queue.

use crate::core::context::Context;
use crate::core::pipeline::stages::{
    commit_stage, dispatch_stage, fetch_stage, issue_stage, writeback_stage,
};
use crate::core::smt::Core;
use crate::isa::program::InstSource;
use crate::soc::memory::Memory;
use crate::soc::memory::controller::LatencyOracle;
use crate::stats::{InstCounters, SimStats};

/// Everything outside the core a context touches while it runs.
pub struct ExecEnv<'a> {
    /// Data memory.
    pub mem: &'a mut dyn Memory,
    /// Memory access latency model.
    pub oracle: &'a mut dyn LatencyOracle,
    /// Instruction memory.
    pub program: &'a dyn InstSource,
    /// Dispatched-instruction counters.
    pub counters: &'a mut InstCounters,
    /// Performance statistics.
    pub stats: &'a mut SimStats,
    /// Predicted load-hit latency, used for speculative readiness.
    pub hit_latency: u64,
}

impl std::fmt::Debug for ExecEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecEnv")
            .field("counters", &self.counters)
            .field("hit_latency", &self.hit_latency)
            .finish_non_exhaustive()
    }
}

/// Advances `ctx` by one cycle on `core`.
///
/// Stopped contexts are skipped. Functional units are ticked once per core
/// cycle by the caller, after every context has run.
pub fn tick_context(core: &mut Core, ctx: &mut Context, env: &mut ExecEnv<'_>, cycle: u64) {
    if !ctx.state.is_running() || !ctx.is_resident() {
        return;
    }
    commit_stage(core, ctx, env, cycle);
    if !ctx.state.is_running() {
        return;
    }
    writeback_stage(core, ctx, env, cycle);
    issue_stage(core, ctx, env, cycle);
    dispatch_stage(core, ctx, env, cycle);
    fetch_stage(core, ctx, env.program, cycle);
}
