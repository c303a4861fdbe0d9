//! Shared physical register file.
//!
//! Each core owns one register file with an integer and an FP bank. Every
//! physical register carries a tri-state ownership tag:
//! 1. **Free:** Allocatable by rename or by context admission.
//! 2. **Alloc:** Destination of exactly one live ROB entry.
//! 3. **Architected:** Committed state of an admitted context.
//!
//! A bank holds `32 * max_contexts` architected slots plus extra renaming
//! registers. Registers still owed to unadmitted slots are held in reserve so
//! that renaming can never starve a later admission.

use crate::common::constants::{MAX_PHYS_REGS, NOT_READY, NUM_FP_REGS, NUM_INT_REGS};
use crate::common::reg::RegBank;

/// Identifier of a physical register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysReg {
    bank: RegBank,
    index: u16,
}

impl PhysReg {
    /// Bank the register belongs to.
    #[inline]
    pub const fn bank(self) -> RegBank {
        self.bank
    }

    /// Index within its bank.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Display for PhysReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bank {
            RegBank::Int => write!(f, "p{}", self.index),
            RegBank::Fp => write!(f, "pf{}", self.index),
        }
    }
}

/// Ownership state of a physical register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RegState {
    /// Not owned.
    #[default]
    Free,
    /// Owned by one in-flight instruction.
    Alloc,
    /// Committed architected state of a context.
    Architected,
}

/// One physical register slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PhysicalRegister {
    /// Ownership state.
    pub state: RegState,
    /// Cycle the value is available, or `NOT_READY`.
    pub ready_cycle: u64,
    /// Cycle the value is predicted to be available (load hit), or `NOT_READY`.
    pub spec_ready_cycle: u64,
    /// Cycle the register was allocated by rename.
    pub alloc_cycle: u64,
}

impl PhysicalRegister {
    const fn has_pending_timestamps(&self) -> bool {
        self.ready_cycle != 0 || self.spec_ready_cycle != 0
    }
}

#[derive(Clone, Debug)]
struct Bank {
    regs: Vec<PhysicalRegister>,
    free: usize,
    reserve: usize,
}

impl Bank {
    fn new(size: usize, reserve: usize) -> Self {
        Self {
            regs: vec![PhysicalRegister::default(); size],
            free: size,
            reserve,
        }
    }

    fn scan_free(&self) -> Option<usize> {
        self.regs.iter().position(|r| r.state == RegState::Free)
    }
}

/// Integer and FP banks of physical registers shared by a core's contexts.
#[derive(Clone, Debug)]
pub struct PhysRegFile {
    int: Bank,
    fp: Bank,
}

impl PhysRegFile {
    /// Creates a register file for `max_contexts` slots with `rename_registers`
    /// extra registers per bank.
    pub fn new(max_contexts: usize, rename_registers: usize) -> Self {
        let int_arch = NUM_INT_REGS * max_contexts;
        let fp_arch = NUM_FP_REGS * max_contexts;
        assert!(
            int_arch.max(fp_arch) + rename_registers <= MAX_PHYS_REGS,
            "register bank exceeds {MAX_PHYS_REGS} entries"
        );
        Self {
            int: Bank::new(int_arch + rename_registers, int_arch),
            fp: Bank::new(fp_arch + rename_registers, fp_arch),
        }
    }

    const fn bank(&self, bank: RegBank) -> &Bank {
        match bank {
            RegBank::Int => &self.int,
            RegBank::Fp => &self.fp,
        }
    }

    const fn bank_mut(&mut self, bank: RegBank) -> &mut Bank {
        match bank {
            RegBank::Int => &mut self.int,
            RegBank::Fp => &mut self.fp,
        }
    }

    /// Total registers in a bank.
    pub fn size(&self, bank: RegBank) -> usize {
        self.bank(bank).regs.len()
    }

    /// Number of Free registers in a bank, reserve included.
    pub const fn free_count(&self, bank: RegBank) -> usize {
        self.bank(bank).free
    }

    /// Free registers rename may still take without touching the reserve.
    pub const fn renamable(&self, bank: RegBank) -> usize {
        let b = self.bank(bank);
        b.free.saturating_sub(b.reserve)
    }

    /// All Free registers of a bank, in index order.
    pub fn free_set(&self, bank: RegBank) -> Vec<PhysReg> {
        self.bank(bank)
            .regs
            .iter()
            .enumerate()
            .filter(|(_, r)| r.state == RegState::Free)
            .map(|(i, _)| PhysReg {
                bank,
                index: i as u16,
            })
            .collect()
    }

    /// Returns the register slot.
    pub fn get(&self, reg: PhysReg) -> &PhysicalRegister {
        &self.bank(reg.bank).regs[reg.index()]
    }

    /// Ownership state of a register.
    pub fn state(&self, reg: PhysReg) -> RegState {
        self.get(reg).state
    }

    /// Finds a Free register that rename may allocate.
    ///
    /// Returns `None` when only reserved registers remain; callers treat this
    /// as a stall.
    pub fn find_free_physreg(&self, bank: RegBank) -> Option<PhysReg> {
        if self.renamable(bank) == 0 {
            return None;
        }
        self.bank(bank).scan_free().map(|i| PhysReg {
            bank,
            index: i as u16,
        })
    }

    /// Transitions a register Free → Alloc for a renamed destination.
    ///
    /// Both readiness timestamps become `NOT_READY`.
    pub fn allocate(&mut self, reg: PhysReg, cycle: u64) {
        let bank = self.bank_mut(reg.bank);
        let slot = &mut bank.regs[reg.index()];
        assert_eq!(slot.state, RegState::Free, "allocating {reg} twice");
        *slot = PhysicalRegister {
            state: RegState::Alloc,
            ready_cycle: NOT_READY,
            spec_ready_cycle: NOT_READY,
            alloc_cycle: cycle,
        };
        bank.free -= 1;
    }

    /// Transitions a squashed destination Alloc → Free.
    pub fn free(&mut self, reg: PhysReg) {
        let bank = self.bank_mut(reg.bank);
        let slot = &mut bank.regs[reg.index()];
        assert_eq!(
            slot.state,
            RegState::Alloc,
            "squashing {reg} which is not allocated"
        );
        *slot = PhysicalRegister::default();
        bank.free += 1;
    }

    /// Transitions a committed destination Alloc → Architected.
    pub fn architect(&mut self, reg: PhysReg) {
        let slot = &mut self.bank_mut(reg.bank).regs[reg.index()];
        assert_eq!(
            slot.state,
            RegState::Alloc,
            "committing {reg} which is not allocated"
        );
        *slot = PhysicalRegister {
            state: RegState::Architected,
            ..PhysicalRegister::default()
        };
    }

    /// Transitions a displaced mapping Architected → Free at commit.
    pub fn release(&mut self, reg: PhysReg) {
        let bank = self.bank_mut(reg.bank);
        let slot = &mut bank.regs[reg.index()];
        assert_eq!(
            slot.state,
            RegState::Architected,
            "releasing {reg} which is not architected"
        );
        *slot = PhysicalRegister::default();
        bank.free += 1;
    }

    /// Stamps the cycle a register's value becomes available.
    pub fn set_ready(&mut self, reg: PhysReg, ready_cycle: u64, spec_ready_cycle: u64) {
        let slot = &mut self.bank_mut(reg.bank).regs[reg.index()];
        debug_assert_eq!(slot.state, RegState::Alloc);
        slot.ready_cycle = ready_cycle;
        slot.spec_ready_cycle = spec_ready_cycle;
    }

    /// Leases `count` registers from the reserve as Architected state for an
    /// admitted context.
    pub fn lease(&mut self, bank: RegBank, count: usize) -> Vec<PhysReg> {
        let b = self.bank_mut(bank);
        assert!(
            b.reserve >= count && b.free >= count,
            "leasing {count} {bank} registers with reserve {} and {} free",
            b.reserve,
            b.free
        );
        let mut leased = Vec::with_capacity(count);
        for (i, slot) in b.regs.iter_mut().enumerate() {
            if leased.len() == count {
                break;
            }
            if slot.state == RegState::Free {
                slot.state = RegState::Architected;
                leased.push(PhysReg {
                    bank,
                    index: i as u16,
                });
            }
        }
        b.free -= count;
        b.reserve -= count;
        leased
    }

    /// Returns an evicted context's architected registers to Free and to the
    /// reserve.
    pub fn check_in(&mut self, regs: &[PhysReg]) {
        for &reg in regs {
            let bank = self.bank_mut(reg.bank);
            let slot = &mut bank.regs[reg.index()];
            assert_eq!(
                slot.state,
                RegState::Architected,
                "checking in {reg} which is not architected"
            );
            assert!(
                !slot.has_pending_timestamps(),
                "checking in {reg} with pending timestamps"
            );
            slot.state = RegState::Free;
            bank.free += 1;
            bank.reserve += 1;
        }
    }
}
