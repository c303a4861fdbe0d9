//! Instruction Set Definitions.
//!
//! A small load/store ISA with integer, FP, memory and control-transfer
//! operations, stored pre-decoded.
//!
//! # Modules
//!
//! * `instruction`: Opcodes, access widths and the instruction record.
//! * `decode`: Pure operand/functional-unit classification.
//! * `execute`: Register-only semantics used by dispatch.
//! * `program`: Instruction sources for fetch.

/// Operand and functional-unit classification.
pub mod decode;

/// Register-only functional semantics.
pub mod execute;

/// Opcodes and the instruction record.
pub mod instruction;

/// Instruction sources (`InstSource`, `Program`).
pub mod program;

pub use decode::{FuClass, OpClass, classify};
pub use instruction::{Inst, MemWidth, Opcode};
pub use program::{InstSource, Program};
