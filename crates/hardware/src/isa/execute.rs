//! Functional semantics of register-only operations.
//!
//! Dispatch executes every instruction at rename time against the context's
//! working registers. This module computes the results that do not touch
//! memory:
//! 1. **ALU:** Integer and FP arithmetic on raw 64-bit values.
//! 2. **Control:** Branch conditions and architectural next-PC.
//! 3. **Addressing:** Effective address of loads and stores.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::isa::instruction::{Inst, Opcode};

/// Result of an arithmetic operation on operand values `a` (rs1) and `b` (rs2).
///
/// Returns `None` for opcodes that produce no register value here (memory
/// operations, branches, `Nop`, `Syscall`). FP operands are IEEE-754 double
/// bit patterns.
pub fn alu(inst: &Inst, pc: u64, a: u64, b: u64) -> Option<u64> {
    let fa = f64::from_bits(a);
    let fb = f64::from_bits(b);
    let value = match inst.opcode {
        Opcode::Add => a.wrapping_add(b),
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::And => a & b,
        Opcode::Or => a | b,
        Opcode::Xor => a ^ b,
        Opcode::Sll => a << (b & 63),
        Opcode::Srl => a >> (b & 63),
        Opcode::Addi => a.wrapping_add(inst.imm as u64),
        Opcode::Mul => a.wrapping_mul(b),
        Opcode::Div => {
            if b == 0 {
                u64::MAX
            } else {
                (a as i64).wrapping_div(b as i64) as u64
            }
        }
        Opcode::FAdd => (fa + fb).to_bits(),
        Opcode::FMul => (fa * fb).to_bits(),
        Opcode::FDiv => (fa / fb).to_bits(),
        Opcode::FMvToFp | Opcode::FMvToInt => a,
        Opcode::Call => pc.wrapping_add(INSTRUCTION_SIZE),
        _ => return None,
    };
    Some(value)
}

/// Architectural next PC of `inst` at `pc` given its operand values.
pub const fn next_pc(inst: &Inst, pc: u64, a: u64, b: u64) -> u64 {
    let fallthrough = pc.wrapping_add(INSTRUCTION_SIZE);
    let target = pc.wrapping_add(inst.imm as u64);
    match inst.opcode {
        Opcode::Beq if a == b => target,
        Opcode::Bne if a != b => target,
        Opcode::Blt if (a as i64) < (b as i64) => target,
        Opcode::Jump | Opcode::Call => target,
        Opcode::Ret => a,
        _ => fallthrough,
    }
}

/// Effective address of a load or store whose base register holds `base`.
#[inline]
pub const fn effective_address(inst: &Inst, base: u64) -> u64 {
    base.wrapping_add(inst.imm as u64)
}
