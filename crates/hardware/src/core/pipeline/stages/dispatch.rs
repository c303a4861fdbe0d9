//! Dispatch Stage: rename, functional execution and enqueue.
//!
//! Instructions leave the fetch queue in order. Every resource is checked
//! before anything is mutated, so a stalled instruction simply stays at the
//! head of the fetch queue:
//! 1. **Capacity:** ROB room, LSQ room for memory operations, issue-queue room.
//! 2. **Rename:** Sources are looked up, then the destination is allocated.
//! 3. **Execute:** The instruction runs against the working registers and
//!    memory; the values it overwrites are kept as shadows for rollback.
//! 4. **Enqueue:** The ROB (and LSQ) entries are appended and the ROB entry is
//!    scheduled for issue.

use tracing::trace;

use crate::common::error::{Fault, Stall};
use crate::common::reg::{ArchReg, RegType, WorkingRegs};
use crate::core::context::Context;
use crate::core::pipeline::engine::ExecEnv;
use crate::core::pipeline::entry::{EntryStatus, InflightEntry, StoreShadow};
use crate::core::pipeline::rename::alloc_physreg;
use crate::core::pipeline::stages::schedule;
use crate::core::pipeline::wakeup::{QueueRef, WakeKey};
use crate::core::smt::Core;
use crate::isa::decode::classify;
use crate::isa::execute::{alu, effective_address, next_pc};
use crate::soc::memory::{MemCmd, Memory};

/// Executes the dispatch stage for one context.
///
/// Dispatches up to `dispatch_width` instructions and records the stall that
/// ended the group, if any.
pub fn dispatch_stage(core: &mut Core, ctx: &mut Context, env: &mut ExecEnv<'_>, cycle: u64) {
    for _ in 0..core.config.dispatch_width {
        if let Err(stall) = dispatch_one(core, ctx, env, cycle) {
            env.stats.record_stall(stall);
            break;
        }
    }
}

fn operand(regs: &WorkingRegs, ty: RegType, n: u8) -> u64 {
    ArchReg::of(ty, n).map_or(0, |r| regs.read(r))
}

/// Performs the memory effect of a load or store at dispatch.
///
/// Returns the loaded value, or the shadow of the bytes a store replaced.
fn access_memory(
    mem: &mut dyn Memory,
    entry: &InflightEntry,
    data: u64,
) -> Result<(Option<u64>, Option<StoreShadow>), Fault> {
    let width = entry.mem_width();
    let size = width.bytes();
    let addr = entry.mem_addr;
    if entry.class.is_load {
        return Ok((Some(mem.read_value(addr, size)?), None));
    }
    let mut bytes = [0u8; 8];
    mem.access(MemCmd::Read, addr, &mut bytes[..size])?;
    mem.write_value(addr, size, data)?;
    Ok((None, Some(StoreShadow { addr, width, bytes })))
}

/// Dispatches the instruction at the head of the fetch queue.
///
/// # Errors
///
/// Returns the `Stall` that prevented dispatch; no state is modified then.
pub fn dispatch_one(
    core: &mut Core,
    ctx: &mut Context,
    env: &mut ExecEnv<'_>,
    cycle: u64,
) -> Result<(), Stall> {
    let Some(&fetched) = ctx.ifq.front() else {
        return Err(Stall::FetchQueueEmpty);
    };
    let class = classify(fetched.inst.opcode);
    if ctx.rob.is_full() {
        return Err(Stall::RobFull);
    }
    if class.is_mem() && ctx.lsq.is_full() {
        return Err(Stall::LsqFull);
    }
    if core.issue_queue.is_full() {
        return Err(Stall::IssueQueueFull);
    }

    let inst = fetched.inst;
    let pc = fetched.pc;
    let mut entry = InflightEntry::new(inst, pc, ctx.next_seq, fetched.pred_pc, cycle);
    entry.src = ctx.rename.sources(&inst, &class);
    alloc_physreg(&mut core.regfile, &mut ctx.rename, &mut entry, cycle)?;

    let _ = ctx.ifq.pop_front();
    ctx.next_seq += 1;
    entry.stack_recover_idx = fetched.stack_recover_idx;
    entry.iq_slot = core.issue_queue.claim();
    if entry.iq_slot.is_some() {
        ctx.icount += 1;
    }

    let a = operand(&ctx.regs, class.src1, inst.rs1);
    let b = operand(&ctx.regs, class.src2, inst.rs2);
    entry.next_pc = next_pc(&inst, pc, a, b);
    let mut result = alu(&inst, pc, a, b);
    let mut store_shadow = None;

    if fetched.fault {
        entry.fault = Some(Fault::Fetch { pc });
    } else if class.is_mem() {
        entry.mem_addr = effective_address(&inst, a);
        match access_memory(env.mem, &entry, b) {
            Ok((value, shadow)) => {
                result = value;
                store_shadow = shadow;
            }
            Err(fault) => entry.fault = Some(fault),
        }
    }

    if let Some(arch) = entry.archreg {
        entry.shadow_value = ctx.regs.read(arch);
        if let Some(value) = result {
            ctx.regs.write(arch, value);
        }
    }
    entry.status = EntryStatus::Queued;

    let seq = entry.seq;
    let rob_handle = ctx.rob.push_tail(entry);
    if class.is_mem() {
        let half = ctx.rob.get(rob_handle).map(|e| InflightEntry {
            store_shadow,
            ..e.memory_half(rob_handle)
        });
        if let Some(half) = half {
            let lsq_handle = ctx.lsq.push_tail(half);
            if let Some(e) = ctx.rob.get_mut(rob_handle) {
                e.partner = Some(lsq_handle);
            }
        }
    }

    core.live_insts += 1;
    env.counters.record_dispatch(ctx.id);

    let link = QueueRef::rob(rob_handle);
    if core.config.inorder_issue {
        ctx.queues.ready.insert(link, WakeKey::Sequence(seq));
    } else {
        schedule(&core.regfile, ctx, link, cycle + 1, cycle);
    }
    trace!(ctx = %ctx.id, seq, pc = format_args!("{pc:#x}"), opcode = ?inst.opcode, "dispatch");
    Ok(())
}
