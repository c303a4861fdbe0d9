//! Instruction Fetch (IF) Stage.
//!
//! Reads up to `fetch_width` instructions along the predicted path into the
//! fetch queue. Prediction is static: conditional branches fall through,
//! jumps and calls go to their direct target, returns pop the slot's
//! return-address stack. A fetch block ends at the first predicted-taken
//! transfer.

use tracing::trace;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::context::Context;
use crate::core::pipeline::fetch_queue::FetchedInst;
use crate::core::smt::Core;
use crate::isa::instruction::{Inst, Opcode};
use crate::isa::program::InstSource;

/// Executes the instruction fetch stage for one context.
///
/// Does nothing while fetch is stalled after a rollback or blocked at an
/// unmapped PC. An unmapped PC enqueues a faulting placeholder so that the
/// fault is taken in order at commit, and blocks fetch until a redirect.
pub fn fetch_stage(core: &mut Core, ctx: &mut Context, program: &dyn InstSource, cycle: u64) {
    if ctx.fetch_blocked || cycle < ctx.fetch_stall_until {
        return;
    }
    let Some(residence) = ctx.residence else {
        return;
    };
    let width = core.config.fetch_width;
    let ras = core.ras_mut(residence.slot);

    for _ in 0..width {
        if ctx.ifq.is_full() {
            break;
        }
        let pc = ctx.fetch_pc;
        let fallthrough = pc.wrapping_add(INSTRUCTION_SIZE);
        let stack_recover_idx = ras.checkpoint();

        let Some(inst) = program.fetch(pc) else {
            ctx.ifq.push(FetchedInst {
                pc,
                inst: Inst::nop(),
                pred_pc: fallthrough,
                stack_recover_idx,
                fault: true,
            });
            ctx.fetch_blocked = true;
            trace!(ctx = %ctx.id, pc = format_args!("{pc:#x}"), "fetch fault");
            break;
        };

        let pred_pc = match inst.opcode {
            Opcode::Jump => pc.wrapping_add(inst.imm as u64),
            Opcode::Call => {
                ras.push(fallthrough);
                pc.wrapping_add(inst.imm as u64)
            }
            Opcode::Ret => ras.pop(),
            _ => fallthrough,
        };
        ctx.ifq.push(FetchedInst {
            pc,
            inst,
            pred_pc,
            stack_recover_idx,
            fault: false,
        });
        ctx.fetch_pc = pred_pc;

        if pred_pc != fallthrough {
            break;
        }
    }
}
