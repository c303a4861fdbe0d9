//! Architected Register Naming and Working Register Values.
//!
//! This module provides the register vocabulary shared by rename and execution:
//! 1. **Banks:** `RegBank` and `RegType` distinguish integer and floating-point registers.
//! 2. **Naming:** `ArchReg` is a flat rename-table index (0-31 integer, 32-63 FP).
//! 3. **Values:** `WorkingRegs` holds one context's speculative architected values.

use crate::common::constants::{NUM_FP_REGS, NUM_INT_REGS, RENAME_TABLE_SIZE};

/// Physical register bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegBank {
    /// Integer registers.
    Int,
    /// Floating-point registers.
    Fp,
}

impl std::fmt::Display for RegBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Fp => write!(f, "fp"),
        }
    }
}

/// Operand or destination register type produced by decode.
///
/// Doubles as the `dest_format` of an in-flight entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RegType {
    /// No register operand.
    #[default]
    None,
    /// Integer register operand.
    Int,
    /// Floating-point register operand.
    Fp,
}

impl RegType {
    /// Returns the bank backing this operand type, if any.
    pub const fn bank(self) -> Option<RegBank> {
        match self {
            Self::None => None,
            Self::Int => Some(RegBank::Int),
            Self::Fp => Some(RegBank::Fp),
        }
    }
}

/// Architected register name, flattened into a rename-table index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArchReg(u8);

impl ArchReg {
    /// Integer register `n`.
    pub const fn int(n: u8) -> Self {
        assert!((n as usize) < NUM_INT_REGS);
        Self(n)
    }

    /// Floating-point register `n`.
    pub const fn fp(n: u8) -> Self {
        assert!((n as usize) < NUM_FP_REGS);
        Self(n + NUM_INT_REGS as u8)
    }

    /// Names register `n` of the given operand type; `None` for `RegType::None`.
    pub const fn of(ty: RegType, n: u8) -> Option<Self> {
        match ty {
            RegType::None => None,
            RegType::Int => Some(Self::int(n)),
            RegType::Fp => Some(Self::fp(n)),
        }
    }

    /// Rebuilds a register from its rename-table index.
    pub const fn from_index(idx: usize) -> Self {
        assert!(idx < RENAME_TABLE_SIZE);
        Self(idx as u8)
    }

    /// Rename-table index of this register.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Register number within its bank.
    #[inline]
    pub const fn number(self) -> usize {
        self.0 as usize % NUM_INT_REGS
    }

    /// Bank this register lives in.
    #[inline]
    pub const fn bank(self) -> RegBank {
        if (self.0 as usize) < NUM_INT_REGS {
            RegBank::Int
        } else {
            RegBank::Fp
        }
    }

    /// Integer register 0 is hard-wired to zero and never renamed.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ArchReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bank() {
            RegBank::Int => write!(f, "r{}", self.number()),
            RegBank::Fp => write!(f, "f{}", self.number()),
        }
    }
}

/// Working (speculative architected) register values of one context.
///
/// Dispatch executes instructions functionally against these values; rollback
/// restores the shadow copies captured at dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingRegs {
    int: [u64; NUM_INT_REGS],
    fp: [u64; NUM_FP_REGS],
}

impl Default for WorkingRegs {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingRegs {
    /// Creates a register set with every register zeroed.
    pub const fn new() -> Self {
        Self {
            int: [0; NUM_INT_REGS],
            fp: [0; NUM_FP_REGS],
        }
    }

    /// Reads a register. Integer register 0 always reads 0.
    pub const fn read(&self, reg: ArchReg) -> u64 {
        match reg.bank() {
            RegBank::Int => {
                if reg.is_zero() {
                    0
                } else {
                    self.int[reg.number()]
                }
            }
            RegBank::Fp => self.fp[reg.number()],
        }
    }

    /// Writes a register. Writes to integer register 0 are ignored.
    pub const fn write(&mut self, reg: ArchReg, val: u64) {
        match reg.bank() {
            RegBank::Int => {
                if !reg.is_zero() {
                    self.int[reg.number()] = val;
                }
            }
            RegBank::Fp => self.fp[reg.number()] = val,
        }
    }

    /// Reads integer register `n`.
    pub const fn int(&self, n: u8) -> u64 {
        self.read(ArchReg::int(n))
    }

    /// Reads floating-point register `n` as raw bits.
    pub const fn fp(&self, n: u8) -> u64 {
        self.read(ArchReg::fp(n))
    }
}
