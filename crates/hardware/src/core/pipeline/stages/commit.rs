//! Commit Stage.
//!
//! Retires up to `commit_width` completed entries strictly from the ROB head.
//! A split memory operation also needs its LSQ half completed. Commit is where
//! precise exceptions happen:
//! 1. **Fault:** The whole context is flushed and stops as `Faulted`.
//! 2. **Exit:** Everything younger than the syscall is squashed, the syscall
//!    retires, and the context stops as `Exited(a0)`.

use tracing::{debug, trace};

use crate::common::constants::REG_A0;
use crate::core::context::{Context, RunState};
use crate::core::pipeline::engine::ExecEnv;
use crate::core::pipeline::entry::EntryStatus;
use crate::core::pipeline::rollback::{RollbackKind, flush_context, rollback_to};
use crate::core::smt::Core;
use crate::isa::instruction::Opcode;
use crate::stats::SimStats;

/// Executes the commit stage for one context.
pub fn commit_stage(core: &mut Core, ctx: &mut Context, env: &mut ExecEnv<'_>, cycle: u64) {
    for _ in 0..core.config.commit_width {
        let Some(head) = ctx.rob.head_handle() else {
            break;
        };
        let Some(entry) = ctx.rob.get(head) else {
            break;
        };
        if entry.status != EntryStatus::Completed {
            break;
        }
        if entry.ea_comp {
            assert_eq!(
                ctx.lsq.head_handle(),
                entry.partner,
                "{}: LSQ head is not the partner of ROB head {}",
                ctx.id,
                entry.seq
            );
            let done = entry
                .partner
                .and_then(|h| ctx.lsq.get(h))
                .is_some_and(|op| op.status == EntryStatus::Completed);
            if !done {
                break;
            }
        }

        if let Some(fault) = entry.fault {
            let pc = entry.pc;
            let report = flush_context(core, ctx, env.mem);
            env.counters.retract(ctx.id, report.squashed);
            env.stats.squashed += report.squashed as u64;
            env.stats.flushes += 1;
            env.stats.faults += 1;
            ctx.state = RunState::Faulted(fault);
            debug!(ctx = %ctx.id, pc = format_args!("{pc:#x}"), %fault, "fault at commit");
            break;
        }

        if entry.inst.opcode == Opcode::Syscall {
            let report = rollback_to(core, ctx, env.mem, head, RollbackKind::Squash, cycle);
            env.counters.retract(ctx.id, report.squashed);
            env.stats.squashed += report.squashed as u64;
            commit_head(core, ctx, env.stats);
            let code = ctx.regs.int(REG_A0);
            ctx.state = RunState::Exited(code);
            debug!(ctx = %ctx.id, code, "exit");
            break;
        }

        commit_head(core, ctx, env.stats);
    }
}

/// Retires the ROB head and its LSQ partner.
///
/// The displaced mapping goes Architected → Free and the destination goes
/// Alloc → Architected.
fn commit_head(core: &mut Core, ctx: &mut Context, stats: &mut SimStats) {
    let Some((handle, mut entry)) = ctx.rob.pop_head() else {
        return;
    };
    if entry.ea_comp {
        let popped = ctx.lsq.pop_head().map(|(h, _)| h);
        assert_eq!(
            popped, entry.partner,
            "{}: LSQ out of sync committing {}",
            ctx.id, entry.seq
        );
    }
    debug_assert!(entry.iq_slot.is_none(), "committing an unissued entry");

    if let Some(phys) = entry.physreg {
        if let Some(old) = entry.old_physreg {
            core.regfile.release(old);
        }
        core.regfile.architect(phys);
    }
    core.live_insts -= 1;
    entry.status = EntryStatus::Committed;
    stats.record_commit(ctx.id, &entry);
    trace!(ctx = %ctx.id, seq = entry.seq, ?handle, pc = format_args!("{:#x}", entry.pc), "commit");
}
