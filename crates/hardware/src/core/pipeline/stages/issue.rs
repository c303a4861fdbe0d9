//! Wakeup and Issue Stage.
//!
//! Moves entries from the waiting queue to the issue queue once their
//! producers have issued, then grants functional units to up to `issue_width`
//! entries. Out-of-order mode picks the due entries of the issue queue in
//! time order; in-order mode walks the ready queue in program order and stops
//! at the first entry that cannot go.
//!
//! Issuing stamps the destination's ready cycle, which is what later wakeups
//! observe, and schedules the completion event.

use tracing::trace;

use crate::core::context::Context;
use crate::core::pipeline::engine::ExecEnv;
use crate::core::pipeline::entry::EntryStatus;
use crate::core::pipeline::stages::{operands_ready_at, schedule};
use crate::core::pipeline::wakeup::{BufferId, QueueRef, WakeKey};
use crate::core::smt::Core;
use crate::core::units::fu_pool::FuHandle;
use crate::soc::memory::MemCmd;

/// Executes the wakeup and issue stage for one context.
pub fn issue_stage(core: &mut Core, ctx: &mut Context, env: &mut ExecEnv<'_>, cycle: u64) {
    if core.config.inorder_issue {
        issue_in_order(core, ctx, env, cycle);
    } else {
        wakeup(core, ctx, cycle);
        issue_out_of_order(core, ctx, env, cycle);
    }
}

fn wakeup(core: &Core, ctx: &mut Context, cycle: u64) {
    while let Some((link, _)) = ctx.queues.waiting.pop_due(cycle) {
        schedule(&core.regfile, ctx, link, cycle, cycle);
    }
}

fn issue_out_of_order(core: &mut Core, ctx: &mut Context, env: &mut ExecEnv<'_>, cycle: u64) {
    let mut issued = 0;
    let mut deferred = Vec::new();
    while issued < core.config.issue_width {
        let Some((link, _)) = ctx.queues.issue.pop_due(cycle) else {
            break;
        };
        let Some(class) = ctx.entry(link).map(|e| e.fu) else {
            continue;
        };
        match core.fu_pool.acquire(class) {
            Some(fu) => {
                issue_entry(core, ctx, env, link, fu, cycle);
                issued += 1;
            }
            None => deferred.push(link),
        }
    }
    for link in deferred {
        ctx.queues.issue.insert(link, WakeKey::Cycle(cycle + 1));
    }
}

fn issue_in_order(core: &mut Core, ctx: &mut Context, env: &mut ExecEnv<'_>, cycle: u64) {
    let mut issued = 0;
    while issued < core.config.issue_width {
        let Some(link) = ctx.queues.ready.peek_next() else {
            break;
        };
        let Some((class, src)) = ctx.entry(link).map(|e| (e.fu, e.src)) else {
            let _ = ctx.queues.ready.pop_next();
            continue;
        };
        if operands_ready_at(&core.regfile, &src).is_none_or(|ready| ready > cycle) {
            break;
        }
        let Some(fu) = core.fu_pool.acquire(class) else {
            break;
        };
        let _ = ctx.queues.ready.pop_next();
        issue_entry(core, ctx, env, link, fu, cycle);
        issued += 1;
    }
}

/// Starts execution of the entry behind `link` on unit `fu`.
///
/// Releases the issue-queue slot, stamps the destination's ready cycle and
/// schedules the completion event. A memory operation adds the latency-oracle
/// result to the port latency; a load stamps the destination held by its ROB
/// half, with a speculative ready cycle that assumes a hit.
fn issue_entry(
    core: &mut Core,
    ctx: &mut Context,
    env: &mut ExecEnv<'_>,
    link: QueueRef,
    fu: FuHandle,
    cycle: u64,
) {
    if let Some(slot) = ctx.entry_mut(link).and_then(|e| e.iq_slot.take()) {
        core.issue_queue.release(slot);
        ctx.icount -= 1;
    }

    let latency = match link.buffer {
        BufferId::Lsq => {
            let Some(op) = ctx.lsq.get_mut(link.handle) else {
                return;
            };
            op.status = EntryStatus::Issued;
            let cmd = if op.class.is_store {
                MemCmd::Write
            } else {
                MemCmd::Read
            };
            let total = fu.latency
                + env
                    .oracle
                    .access_latency(cmd, op.mem_addr, op.mem_width().bytes(), cycle);
            if op.class.is_load {
                let dest = op
                    .partner
                    .and_then(|h| ctx.rob.get(h))
                    .and_then(|rob| rob.physreg);
                if let Some(phys) = dest {
                    core.regfile.set_ready(
                        phys,
                        cycle + total,
                        cycle + fu.latency + env.hit_latency,
                    );
                }
            }
            total
        }
        BufferId::Rob => {
            let Some(entry) = ctx.rob.get_mut(link.handle) else {
                return;
            };
            entry.status = EntryStatus::Issued;
            if let Some(phys) = entry.physreg.filter(|_| !entry.ea_comp) {
                core.regfile
                    .set_ready(phys, cycle + fu.latency, cycle + fu.latency);
            }
            fu.latency
        }
    };

    ctx.queues.event.insert(link, WakeKey::Cycle(cycle + latency));
    trace!(ctx = %ctx.id, ?link, unit = fu.unit, latency, "issue");
}
