//! Hardware thread context.
//!
//! A context is the per-thread half of an SMT core: its own ROB, LSQ, fetch
//! queue, rename table, working registers and wakeup queues. The shared half
//! (register file, issue queue, functional units) lives in [`Core`].
//! Buffers are sized by the slot template of the core that admits the context.
//!
//! [`Core`]: crate::core::smt::Core

use crate::common::error::Fault;
use crate::common::reg::WorkingRegs;
use crate::core::pipeline::buffer::EntryBuffer;
use crate::core::pipeline::entry::InflightEntry;
use crate::core::pipeline::fetch_queue::FetchQueue;
use crate::core::pipeline::rename::RenameTable;
use crate::core::pipeline::wakeup::{BufferId, QueueRef, WakeupQueues};
use crate::core::smt::SlotId;

/// Identifier of a context within a simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub usize);

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ctx{}", self.0)
    }
}

/// Whether a context still makes progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Fetching and executing.
    Running,
    /// Committed an exit syscall with the given code.
    Exited(u64),
    /// Committed a faulting instruction.
    Faulted(Fault),
}

impl RunState {
    /// True while the context is `Running`.
    #[inline]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Where an admitted context lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Residence {
    /// Core id.
    pub core: usize,
    /// Slot on that core.
    pub slot: SlotId,
}

/// Per-thread speculative state.
#[derive(Debug)]
pub struct Context {
    /// Identifier.
    pub id: ContextId,
    /// Reorder buffer.
    pub rob: EntryBuffer,
    /// Load/store queue.
    pub lsq: EntryBuffer,
    /// Instruction fetch queue.
    pub ifq: FetchQueue,
    /// Architected → physical register map.
    pub rename: RenameTable,
    /// Speculative architected register values.
    pub regs: WorkingRegs,
    /// Waiting, issue, event and ready queues.
    pub queues: WakeupQueues,
    /// Dispatched instructions still holding an issue-queue slot.
    pub icount: usize,
    /// Next PC to fetch.
    pub fetch_pc: u64,
    /// Fetch resumes at this cycle.
    pub fetch_stall_until: u64,
    /// Fetch stopped at an unmapped PC; cleared by any redirect.
    pub fetch_blocked: bool,
    /// Next dispatch sequence number.
    pub next_seq: u64,
    /// Run state.
    pub state: RunState,
    /// Admission slot, `None` while detached.
    pub residence: Option<Residence>,
}

impl Context {
    /// Creates a detached context that will start fetching at `pc`.
    pub fn new(id: ContextId, pc: u64) -> Self {
        Self {
            id,
            rob: EntryBuffer::new(0),
            lsq: EntryBuffer::new(0),
            ifq: FetchQueue::new(0),
            rename: RenameTable::new(),
            regs: WorkingRegs::new(),
            queues: WakeupQueues::new(0, 0),
            icount: 0,
            fetch_pc: pc,
            fetch_stall_until: 0,
            fetch_blocked: false,
            next_seq: 0,
            state: RunState::Running,
            residence: None,
        }
    }

    /// True if admitted to some core.
    #[inline]
    pub const fn is_resident(&self) -> bool {
        self.residence.is_some()
    }

    /// True if nothing is in flight: empty ROB, LSQ and fetch queue.
    pub fn is_drained(&self) -> bool {
        self.rob.is_empty() && self.lsq.is_empty() && self.ifq.is_empty()
    }

    /// Resolves a wakeup-queue link.
    pub fn entry(&self, link: QueueRef) -> Option<&InflightEntry> {
        match link.buffer {
            BufferId::Rob => self.rob.get(link.handle),
            BufferId::Lsq => self.lsq.get(link.handle),
        }
    }

    /// Resolves a wakeup-queue link mutably.
    pub fn entry_mut(&mut self, link: QueueRef) -> Option<&mut InflightEntry> {
        match link.buffer {
            BufferId::Rob => self.rob.get_mut(link.handle),
            BufferId::Lsq => self.lsq.get_mut(link.handle),
        }
    }
}
