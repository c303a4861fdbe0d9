//! In-flight instruction record shared by the ROB and the LSQ.
//!
//! A load or store is split in two: an effective-address entry in the ROB
//! (`ea_comp = true`) and a memory-operation entry in the LSQ at the matching
//! relative position. The two halves link to each other through `partner`.
//! The destination register of a load belongs to the ROB half.

use crate::common::error::Fault;
use crate::common::reg::{ArchReg, RegType};
use crate::core::pipeline::buffer::EntryHandle;
use crate::core::pipeline::issue_queue::IqSlot;
use crate::core::pipeline::regfile::PhysReg;
use crate::isa::decode::{FuClass, OpClass, classify};
use crate::isa::instruction::{Inst, MemWidth, Opcode};

/// Lifecycle state of an in-flight entry.
///
/// `Dispatched → Queued → Issued → Completed → Committed`, or any
/// non-terminal state `→ Squashed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EntryStatus {
    /// Created at dispatch.
    #[default]
    Dispatched,
    /// Waiting in a wakeup queue.
    Queued,
    /// Holding a functional unit.
    Issued,
    /// Result produced.
    Completed,
    /// Retired in program order.
    Committed,
    /// Discarded by rollback.
    Squashed,
}

impl EntryStatus {
    /// Committed or Squashed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Squashed)
    }
}

/// Memory contents a store overwrote, replayed on rollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreShadow {
    /// Store address.
    pub addr: u64,
    /// Store width.
    pub width: MemWidth,
    /// Bytes at `addr` before the store; only the first `width` bytes are valid.
    pub bytes: [u8; 8],
}

impl StoreShadow {
    /// The valid pre-store bytes.
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.width.bytes()]
    }
}

/// One in-flight instruction (or the memory half of one).
#[derive(Clone, Debug)]
pub struct InflightEntry {
    /// The instruction.
    pub inst: Inst,
    /// Its address.
    pub pc: u64,
    /// Per-context dispatch sequence number.
    pub seq: u64,
    /// Architectural next PC.
    pub next_pc: u64,
    /// Next PC predicted by fetch.
    pub pred_pc: u64,
    /// Opcode classification.
    pub class: OpClass,
    /// Unit class that executes this half.
    pub fu: FuClass,
    /// Destination register owned by this entry.
    pub physreg: Option<PhysReg>,
    /// Mapping `physreg` displaced in the rename table.
    pub old_physreg: Option<PhysReg>,
    /// Architected destination.
    pub archreg: Option<ArchReg>,
    /// Destination register type.
    pub dest_format: RegType,
    /// Physical registers read by this half.
    pub src: [Option<PhysReg>; 2],
    /// Effective-address half of a split memory operation.
    pub ea_comp: bool,
    /// Other half of a split memory operation.
    pub partner: Option<EntryHandle>,
    /// Return-address-stack checkpoint taken at fetch.
    pub stack_recover_idx: usize,
    /// Value of `archreg` before this instruction executed.
    pub shadow_value: u64,
    /// Memory a store overwrote.
    pub store_shadow: Option<StoreShadow>,
    /// Effective address of a memory operation.
    pub mem_addr: u64,
    /// Claimed issue-queue slot.
    pub iq_slot: Option<IqSlot>,
    /// Exception to take at commit.
    pub fault: Option<Fault>,
    /// Lifecycle state.
    pub status: EntryStatus,
    /// Cycle of dispatch.
    pub dispatch_cycle: u64,
}

impl InflightEntry {
    /// Creates a ROB entry for `inst` with no registers renamed yet.
    pub const fn new(inst: Inst, pc: u64, seq: u64, pred_pc: u64, cycle: u64) -> Self {
        let class = classify(inst.opcode);
        Self {
            inst,
            pc,
            seq,
            next_pc: pred_pc,
            pred_pc,
            class,
            fu: if class.is_mem() {
                FuClass::IntAlu
            } else {
                class.fu
            },
            physreg: None,
            old_physreg: None,
            archreg: None,
            dest_format: RegType::None,
            src: [None, None],
            ea_comp: class.is_mem(),
            partner: None,
            stack_recover_idx: 0,
            shadow_value: 0,
            store_shadow: None,
            mem_addr: 0,
            iq_slot: None,
            fault: None,
            status: EntryStatus::Dispatched,
            dispatch_cycle: cycle,
        }
    }

    /// Builds the LSQ half of a split memory operation from its ROB half.
    ///
    /// The memory half reads only the store data register; the address
    /// dependency is the completion of the ROB half.
    pub const fn memory_half(&self, rob_handle: EntryHandle) -> Self {
        Self {
            fu: self.class.fu,
            physreg: None,
            old_physreg: None,
            archreg: None,
            dest_format: RegType::None,
            src: [None, self.src[1]],
            ea_comp: false,
            partner: Some(rob_handle),
            store_shadow: None,
            iq_slot: None,
            fault: None,
            ..*self
        }
    }

    /// True for the LSQ half of a store.
    #[inline]
    pub const fn is_store_op(&self) -> bool {
        !self.ea_comp && self.class.is_store
    }

    /// True if fetch predicted a different next PC than execution produced.
    #[inline]
    pub const fn mispredicted(&self) -> bool {
        self.inst.opcode.is_control() && self.pred_pc != self.next_pc
    }

    /// Access width of a memory operation.
    pub const fn mem_width(&self) -> MemWidth {
        match self.inst.opcode {
            Opcode::Load(w) | Opcode::Store(w) => w,
            _ => MemWidth::Double,
        }
    }
}
