//! Rollback controller: undoes speculative state from the ROB tail.
//!
//! Two entry points share one per-entry undo step:
//! 1. **`flush_context`:** Squashes every in-flight instruction of a context.
//! 2. **`rollback_to`:** Squashes everything younger than a target entry.
//!
//! Undoing an entry replays the memory bytes a store overwrote, unlinks both
//! halves from the wakeup queues, returns the issue-queue slot, frees the
//! destination register, restores the rename mapping and restores the working
//! register value captured at dispatch. Entries are undone youngest first, so
//! memory and registers end up exactly as they were before the oldest squashed
//! instruction executed.
//!
//! Broken invariants (queue desync, missing LSQ partner, unknown target) panic.

use tracing::{debug, trace};

use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::context::Context;
use crate::core::pipeline::buffer::EntryHandle;
use crate::core::pipeline::wakeup::QueueRef;
use crate::core::smt::Core;
use crate::isa::instruction::Opcode;
use crate::soc::memory::{MemCmd, Memory};

/// Outcome of a flush or rollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquashReport {
    /// ROB entries squashed.
    pub squashed: usize,
    /// PC fetch was redirected to.
    pub redirect_pc: u64,
}

/// Why a rollback happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollbackKind {
    /// Discard younger work and resume after the target.
    Squash,
    /// The target is a control transfer that resolved to `corrected_pc`.
    Mispredict {
        /// Architectural next PC of the target.
        corrected_pc: u64,
    },
}

/// Undoes the youngest ROB entry and its LSQ partner.
fn squash_tail(core: &mut Core, ctx: &mut Context, mem: &mut dyn Memory) {
    let Some((handle, mut entry)) = ctx.rob.pop_tail() else {
        panic!("{}: squashing from an empty ROB", ctx.id);
    };

    if entry.ea_comp {
        let Some((lsq_handle, op)) = ctx.lsq.pop_tail() else {
            panic!("{}: ROB entry {} has no LSQ partner", ctx.id, entry.seq);
        };
        assert_eq!(
            op.partner,
            Some(handle),
            "{}: LSQ tail is not the partner of ROB entry {}",
            ctx.id,
            entry.seq
        );
        if let Some(shadow) = op.store_shadow {
            let mut bytes = shadow.bytes;
            let len = shadow.width.bytes();
            if let Err(fault) = mem.access(MemCmd::Write, shadow.addr, &mut bytes[..len]) {
                panic!("{}: replaying store shadow failed: {fault}", ctx.id);
            }
        }
        ctx.queues.remove_all(QueueRef::lsq(lsq_handle));
    }

    ctx.queues.remove_all(QueueRef::rob(handle));

    if let Some(slot) = entry.iq_slot.take() {
        core.issue_queue.release(slot);
        ctx.icount -= 1;
    }

    if let Some(phys) = entry.physreg {
        core.regfile.free(phys);
        let Some(arch) = entry.archreg else {
            panic!("{}: {phys} renamed without an architected register", ctx.id);
        };
        ctx.rename.set(arch, entry.old_physreg);
        ctx.regs.write(arch, entry.shadow_value);
    }

    core.live_insts -= 1;
    trace!(ctx = %ctx.id, seq = entry.seq, pc = format_args!("{:#x}", entry.pc), "squash");
}

/// Squashes every in-flight instruction of `ctx` and resets its buffers.
///
/// Fetch restarts at the PC of the oldest squashed instruction, else the
/// oldest fetched PC, else the current fetch PC. The caller retracts
/// `squashed` from its instruction counters.
pub fn flush_context(core: &mut Core, ctx: &mut Context, mem: &mut dyn Memory) -> SquashReport {
    let redirect_pc = ctx
        .rob
        .head_handle()
        .and_then(|h| ctx.rob.get(h))
        .map(|e| e.pc)
        .or_else(|| ctx.ifq.oldest_pc())
        .unwrap_or(ctx.fetch_pc);

    let mut squashed = 0;
    while !ctx.rob.is_empty() {
        squash_tail(core, ctx, mem);
        squashed += 1;
    }
    assert!(ctx.lsq.is_empty(), "{}: LSQ out of sync after flush", ctx.id);
    debug_assert_eq!(ctx.icount, 0);

    let _ = ctx.ifq.drain();
    ctx.queues.clear();
    ctx.icount = 0;
    ctx.rob.reset();
    ctx.lsq.reset();
    ctx.fetch_pc = redirect_pc;
    ctx.fetch_blocked = false;

    debug!(
        ctx = %ctx.id,
        squashed,
        redirect = format_args!("{redirect_pc:#x}"),
        "flush"
    );
    SquashReport {
        squashed,
        redirect_pc,
    }
}

/// Squashes every ROB entry strictly younger than `target`.
///
/// The target itself survives, so the ROB never drops below one entry. Fetch
/// is redirected to the target's next PC (or the corrected PC of a
/// misprediction) and stalled for the misprediction penalty. On a
/// misprediction the slot's return-address stack is restored to the
/// checkpoint taken before the target was fetched, then the target's own
/// call push or return pop is replayed.
///
/// # Panics
///
/// Panics if `target` is not a live ROB entry.
pub fn rollback_to(
    core: &mut Core,
    ctx: &mut Context,
    mem: &mut dyn Memory,
    target: EntryHandle,
    kind: RollbackKind,
    cycle: u64,
) -> SquashReport {
    let Some(entry) = ctx.rob.get(target) else {
        panic!("{}: unknown rollback target {target:?}", ctx.id);
    };
    let (pc, opcode, next_pc, recover_idx) =
        (entry.pc, entry.inst.opcode, entry.next_pc, entry.stack_recover_idx);

    let mut squashed = 0;
    while ctx.rob.tail_handle() != Some(target) {
        squash_tail(core, ctx, mem);
        squashed += 1;
    }
    let _ = ctx.ifq.drain();

    let redirect_pc = match kind {
        RollbackKind::Squash => next_pc,
        RollbackKind::Mispredict { corrected_pc } => {
            if let Some(residence) = ctx.residence {
                let ras = core.ras_mut(residence.slot);
                ras.recover(recover_idx);
                match opcode {
                    Opcode::Call => ras.push(pc.wrapping_add(INSTRUCTION_SIZE)),
                    Opcode::Ret => {
                        let _ = ras.pop();
                    }
                    _ => {}
                }
            }
            corrected_pc
        }
    };

    ctx.fetch_pc = redirect_pc;
    ctx.fetch_blocked = false;
    ctx.fetch_stall_until = cycle + core.config.mispredict_penalty;

    debug!(
        ctx = %ctx.id,
        squashed,
        ?kind,
        target = format_args!("{pc:#x}"),
        redirect = format_args!("{redirect_pc:#x}"),
        "rollback"
    );
    SquashReport {
        squashed,
        redirect_pc,
    }
}
