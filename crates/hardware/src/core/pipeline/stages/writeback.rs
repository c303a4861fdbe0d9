//! Writeback (WB) Stage.
//!
//! Completes every entry whose execution event falls due this cycle. A
//! completed address computation hands its memory half to the scheduler, and
//! a control transfer that resolved against its prediction rolls the context
//! back to itself.

use tracing::trace;

use crate::core::context::Context;
use crate::core::pipeline::buffer::EntryHandle;
use crate::core::pipeline::engine::ExecEnv;
use crate::core::pipeline::entry::EntryStatus;
use crate::core::pipeline::rollback::{RollbackKind, rollback_to};
use crate::core::pipeline::stages::schedule;
use crate::core::pipeline::wakeup::{BufferId, QueueRef, WakeKey};
use crate::core::smt::Core;

/// Executes the writeback stage for one context.
pub fn writeback_stage(core: &mut Core, ctx: &mut Context, env: &mut ExecEnv<'_>, cycle: u64) {
    while let Some((link, _)) = ctx.queues.event.pop_due(cycle) {
        match link.buffer {
            BufferId::Lsq => {
                if let Some(op) = ctx.lsq.get_mut(link.handle) {
                    op.status = EntryStatus::Completed;
                    trace!(ctx = %ctx.id, seq = op.seq, "memory op complete");
                }
            }
            BufferId::Rob => complete_rob_entry(core, ctx, env, link.handle, cycle),
        }
    }
}

fn complete_rob_entry(
    core: &mut Core,
    ctx: &mut Context,
    env: &mut ExecEnv<'_>,
    handle: EntryHandle,
    cycle: u64,
) {
    let Some(entry) = ctx.rob.get_mut(handle) else {
        return;
    };
    entry.status = EntryStatus::Completed;
    let (seq, partner, faulted) = (entry.seq, entry.partner, entry.fault.is_some());
    let mispredicted = entry.mispredicted().then_some(entry.next_pc);
    trace!(ctx = %ctx.id, seq, "complete");

    if let Some(lsq_handle) = partner {
        release_memory_half(core, ctx, lsq_handle, seq, faulted, cycle);
    }

    if let Some(corrected_pc) = mispredicted {
        let report = rollback_to(
            core,
            ctx,
            env.mem,
            handle,
            RollbackKind::Mispredict { corrected_pc },
            cycle,
        );
        env.counters.retract(ctx.id, report.squashed);
        env.stats.branch_mispredictions += 1;
        env.stats.squashed += report.squashed as u64;
    }
}

/// Makes the memory half of a split operation eligible for issue.
///
/// A faulting access never reaches memory timing: its memory half completes
/// immediately and the fault is taken when the ROB half commits.
fn release_memory_half(
    core: &Core,
    ctx: &mut Context,
    lsq_handle: EntryHandle,
    seq: u64,
    faulted: bool,
    cycle: u64,
) {
    let link = QueueRef::lsq(lsq_handle);
    if faulted {
        if let Some(op) = ctx.lsq.get_mut(lsq_handle) {
            op.status = EntryStatus::Completed;
        }
    } else if core.config.inorder_issue {
        ctx.queues.ready.insert(link, WakeKey::Sequence(seq));
    } else {
        schedule(&core.regfile, ctx, link, cycle + 1, cycle);
    }
}
