//! Rename: architected-to-physical register mapping.
//!
//! Each context owns a 64-entry table (0..32 integer, 32..64 FP). Sources are
//! looked up before the destination is renamed, so an instruction that reads
//! its own destination (`addi r5, r5, 16`) sees the previous producer.

use crate::common::constants::{NUM_FP_REGS, NUM_INT_REGS, RENAME_TABLE_SIZE};
use crate::common::error::Stall;
use crate::common::reg::{ArchReg, RegType};
use crate::core::pipeline::entry::InflightEntry;
use crate::core::pipeline::regfile::{PhysReg, PhysRegFile};
use crate::isa::decode::OpClass;
use crate::isa::instruction::Inst;

/// Per-context architected → physical register map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameTable {
    map: [Option<PhysReg>; RENAME_TABLE_SIZE],
}

impl Default for RenameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RenameTable {
    /// Creates an empty table (context not admitted).
    pub const fn new() -> Self {
        Self {
            map: [None; RENAME_TABLE_SIZE],
        }
    }

    /// Current mapping of `reg`.
    #[inline]
    pub const fn get(&self, reg: ArchReg) -> Option<PhysReg> {
        self.map[reg.index()]
    }

    /// Overwrites the mapping of `reg`.
    #[inline]
    pub const fn set(&mut self, reg: ArchReg, phys: Option<PhysReg>) {
        self.map[reg.index()] = phys;
    }

    /// Installs leased architected registers as the initial mapping.
    pub fn install(&mut self, int_regs: &[PhysReg], fp_regs: &[PhysReg]) {
        assert_eq!(int_regs.len(), NUM_INT_REGS);
        assert_eq!(fp_regs.len(), NUM_FP_REGS);
        for (slot, &reg) in self.map.iter_mut().zip(int_regs.iter().chain(fp_regs)) {
            *slot = Some(reg);
        }
    }

    /// Clears the table and returns every mapped register.
    pub fn take_all(&mut self) -> Vec<PhysReg> {
        self.map.iter_mut().filter_map(Option::take).collect()
    }

    /// True if no register is mapped.
    pub fn is_empty(&self) -> bool {
        self.map.iter().all(Option::is_none)
    }

    /// Physical registers read by `inst`.
    ///
    /// Integer register 0 has no producer and is always ready.
    pub fn sources(&self, inst: &Inst, class: &OpClass) -> [Option<PhysReg>; 2] {
        let lookup = |ty: RegType, n: u8| {
            ArchReg::of(ty, n)
                .filter(|r| !r.is_zero())
                .and_then(|r| self.get(r))
        };
        [lookup(class.src1, inst.rs1), lookup(class.src2, inst.rs2)]
    }
}

/// Renames the destination of `entry`.
///
/// Records the displaced mapping in `old_physreg`, moves a free register
/// Free → Alloc and points the table at it. Integer register 0 is never
/// renamed. When the bank is exhausted nothing is modified.
pub fn alloc_physreg(
    regfile: &mut PhysRegFile,
    table: &mut RenameTable,
    entry: &mut InflightEntry,
    cycle: u64,
) -> Result<(), Stall> {
    let dest = entry.class.dest;
    let Some(archreg) = ArchReg::of(dest, entry.inst.rd) else {
        return Ok(());
    };
    if archreg.is_zero() {
        return Ok(());
    }

    let bank = archreg.bank();
    let phys = regfile
        .find_free_physreg(bank)
        .ok_or(Stall::NoFreeRegister(bank))?;

    regfile.allocate(phys, cycle);
    entry.old_physreg = table.get(archreg);
    entry.physreg = Some(phys);
    entry.archreg = Some(archreg);
    entry.dest_format = dest;
    table.set(archreg, Some(phys));
    Ok(())
}
