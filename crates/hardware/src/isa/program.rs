//! Instruction sources.
//!
//! Fetch reads pre-decoded instructions through the `InstSource` trait.
//! `Program` is the in-memory implementation: a base address and a dense
//! vector of instructions, one every `INSTRUCTION_SIZE` bytes.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::isa::instruction::Inst;

/// Supplies instructions to fetch.
pub trait InstSource {
    /// Returns the instruction at `pc`, or `None` if `pc` is not mapped.
    fn fetch(&self, pc: u64) -> Option<Inst>;
}

/// A contiguous program image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    base: u64,
    insts: Vec<Inst>,
}

impl Program {
    /// Creates a program whose first instruction lives at `base`.
    pub const fn new(base: u64, insts: Vec<Inst>) -> Self {
        Self { base, insts }
    }

    /// Address of the first instruction.
    #[inline]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Address one past the last instruction.
    pub const fn end(&self) -> u64 {
        self.base + self.insts.len() as u64 * INSTRUCTION_SIZE
    }

    /// Address of instruction `idx`.
    pub const fn pc_of(&self, idx: usize) -> u64 {
        self.base + idx as u64 * INSTRUCTION_SIZE
    }

    /// Number of instructions.
    pub const fn len(&self) -> usize {
        self.insts.len()
    }

    /// True if the program holds no instructions.
    pub const fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

impl InstSource for Program {
    fn fetch(&self, pc: u64) -> Option<Inst> {
        let offset = pc.checked_sub(self.base)?;
        if offset % INSTRUCTION_SIZE != 0 {
            return None;
        }
        self.insts
            .get(usize::try_from(offset / INSTRUCTION_SIZE).ok()?)
            .copied()
    }
}
