//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics of the simulated cores. It provides:
//! 1. **Instruction counters:** Dispatched instructions, globally and per thread, retracted by squashes.
//! 2. **Cycle and IPC:** Total cycles, committed instructions and derived IPC.
//! 3. **Instruction mix:** Commits by category (ALU, load, store, branch, system, FP).
//! 4. **Speculation:** Mispredictions, squashed instructions, flushes and faults.
//! 5. **Stalls:** Dispatch stall counts by reason.

use std::collections::BTreeMap;

use crate::common::error::Stall;
use crate::core::context::ContextId;
use crate::core::pipeline::entry::InflightEntry;
use crate::isa::instruction::Opcode;

/// Instructions in flight, counted at dispatch and retracted on squash.
///
/// After every squash the caller subtracts the reported count so that the
/// totals only ever include instructions that are still live or committed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstCounters {
    total: u64,
    per_thread: BTreeMap<ContextId, u64>,
}

impl InstCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one dispatched instruction of `ctx`.
    pub fn record_dispatch(&mut self, ctx: ContextId) {
        self.total += 1;
        *self.per_thread.entry(ctx).or_insert(0) += 1;
    }

    /// Subtracts `squashed` instructions of `ctx`.
    ///
    /// # Panics
    ///
    /// Panics if more instructions are retracted than were recorded.
    pub fn retract(&mut self, ctx: ContextId, squashed: usize) {
        let n = squashed as u64;
        let thread = self.per_thread.entry(ctx).or_insert(0);
        assert!(
            *thread >= n && self.total >= n,
            "retracting {n} instructions of {ctx} with only {thread} recorded"
        );
        *thread -= n;
        self.total -= n;
    }

    /// Global count.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Count of one thread.
    pub fn thread(&self, ctx: ContextId) -> u64 {
        self.per_thread.get(&ctx).copied().unwrap_or(0)
    }
}

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed.
    pub committed: u64,
    /// Commits per context.
    pub committed_per_thread: BTreeMap<ContextId, u64>,

    /// Committed integer loads.
    pub inst_load: u64,
    /// Committed integer stores.
    pub inst_store: u64,
    /// Committed branches, jumps, calls and returns.
    pub inst_branch: u64,
    /// Committed integer ALU instructions.
    pub inst_alu: u64,
    /// Committed syscalls.
    pub inst_system: u64,
    /// Committed FP loads.
    pub inst_fp_load: u64,
    /// Committed FP stores.
    pub inst_fp_store: u64,
    /// Committed FP arithmetic and moves.
    pub inst_fp_arith: u64,

    /// Control transfers resolved to a different PC than predicted.
    pub branch_mispredictions: u64,
    /// Instructions discarded by rollbacks and flushes.
    pub squashed: u64,
    /// Context flushes that discarded instructions (faults and migrations).
    pub flushes: u64,
    /// Contexts stopped by a committed fault.
    pub faults: u64,

    /// Dispatch stalls on a full reorder buffer.
    pub stalls_rob: u64,
    /// Dispatch stalls on a full load/store queue.
    pub stalls_lsq: u64,
    /// Dispatch stalls on a full issue queue.
    pub stalls_issue_queue: u64,
    /// Dispatch stalls on an exhausted register bank.
    pub stalls_regs: u64,
    /// Dispatch cycles with an empty fetch queue.
    pub stalls_fetch: u64,
}

impl SimStats {
    /// Records one committed instruction of `ctx`.
    pub fn record_commit(&mut self, ctx: ContextId, entry: &InflightEntry) {
        self.committed += 1;
        *self.committed_per_thread.entry(ctx).or_insert(0) += 1;
        let counter = match entry.inst.opcode {
            Opcode::Load(_) => &mut self.inst_load,
            Opcode::Store(_) => &mut self.inst_store,
            Opcode::FLoad => &mut self.inst_fp_load,
            Opcode::FStore => &mut self.inst_fp_store,
            Opcode::FAdd
            | Opcode::FMul
            | Opcode::FDiv
            | Opcode::FMvToFp
            | Opcode::FMvToInt => &mut self.inst_fp_arith,
            Opcode::Syscall => &mut self.inst_system,
            op if op.is_control() => &mut self.inst_branch,
            _ => &mut self.inst_alu,
        };
        *counter += 1;
    }

    /// Records a dispatch stall.
    pub const fn record_stall(&mut self, stall: Stall) {
        match stall {
            Stall::RobFull => self.stalls_rob += 1,
            Stall::LsqFull => self.stalls_lsq += 1,
            Stall::IssueQueueFull => self.stalls_issue_queue += 1,
            Stall::NoFreeRegister(_) => self.stalls_regs += 1,
            Stall::FetchQueueEmpty => self.stalls_fetch += 1,
        }
    }

    /// Commits of one context.
    pub fn committed_by(&self, ctx: ContextId) -> u64 {
        self.committed_per_thread.get(&ctx).copied().unwrap_or(0)
    }

    /// Condensed view of the counters.
    pub fn summary(&self) -> StatsSummary {
        let cyc = self.cycles.max(1);
        StatsSummary {
            cycles: self.cycles,
            committed: self.committed,
            ipc: self.committed as f64 / cyc as f64,
            mispredictions: self.branch_mispredictions,
            squashed: self.squashed,
            flushes: self.flushes,
            faults: self.faults,
            dispatch_stalls: self.stalls_rob
                + self.stalls_lsq
                + self.stalls_issue_queue
                + self.stalls_regs,
        }
    }
}

/// Headline numbers of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsSummary {
    /// Cycles simulated.
    pub cycles: u64,
    /// Instructions committed.
    pub committed: u64,
    /// Committed instructions per cycle.
    pub ipc: f64,
    /// Mispredicted control transfers.
    pub mispredictions: u64,
    /// Squashed instructions.
    pub squashed: u64,
    /// Context flushes.
    pub flushes: u64,
    /// Committed faults.
    pub faults: u64,
    /// Resource stalls at dispatch (empty fetch queue excluded).
    pub dispatch_stalls: u64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "sim_cycles               {}", self.cycles)?;
        writeln!(f, "sim_insts                {}", self.committed)?;
        writeln!(f, "sim_ipc                  {:.4}", self.ipc)?;
        writeln!(f, "bp.mispredicts           {}", self.mispredictions)?;
        writeln!(f, "rollback.squashed        {}", self.squashed)?;
        writeln!(f, "rollback.flushes         {}", self.flushes)?;
        writeln!(f, "rollback.faults          {}", self.faults)?;
        write!(f, "stalls.dispatch          {}", self.dispatch_stalls)
    }
}
