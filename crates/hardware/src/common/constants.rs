//! Global Simulator Constants.
//!
//! This module defines constants shared by the register file, rename table and
//! timing model. It includes:
//! 1. **Register Constants:** Architected register counts per bank and rename table size.
//! 2. **Instruction Constants:** Fixed instruction size used by fetch and branch targets.
//! 3. **Timing Constants:** Sentinel cycle values used by readiness timestamps.

/// Number of architected integer registers per context.
pub const NUM_INT_REGS: usize = 32;

/// Number of architected floating-point registers per context.
pub const NUM_FP_REGS: usize = 32;

/// Largest physical register bank; `PhysReg` indices are 16 bits wide.
pub const MAX_PHYS_REGS: usize = 1 << 16;

/// Number of rename table entries per context (integer bank followed by FP bank).
pub const RENAME_TABLE_SIZE: usize = NUM_INT_REGS + NUM_FP_REGS;

/// Size of every instruction in bytes.
pub const INSTRUCTION_SIZE: u64 = 4;

/// Readiness timestamp meaning "producer has not been scheduled yet".
pub const NOT_READY: u64 = u64::MAX;

/// Integer register holding the first argument / return value (`a0`).
pub const REG_A0: u8 = 10;

/// Integer register conventionally used as the link register by `Call`.
pub const REG_RA: u8 = 1;
