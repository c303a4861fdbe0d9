//! Instruction fetch queue (IFQ).
//!
//! Fetch appends predicted-path instructions; dispatch consumes them from the
//! front. Rollback and flush drain the whole queue.

use std::collections::VecDeque;

use crate::isa::instruction::Inst;

/// One fetched instruction with its prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchedInst {
    /// Fetch address.
    pub pc: u64,
    /// The instruction (a `Nop` placeholder when `fault` is set).
    pub inst: Inst,
    /// Predicted next PC.
    pub pred_pc: u64,
    /// RAS top-of-stack before this instruction's own push or pop.
    pub stack_recover_idx: usize,
    /// Fetch found no instruction at `pc`.
    pub fault: bool,
}

/// Bounded FIFO of fetched instructions.
#[derive(Clone, Debug, Default)]
pub struct FetchQueue {
    entries: VecDeque<FetchedInst>,
    capacity: usize,
}

impl FetchQueue {
    /// Creates an empty queue of `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if no further entry fits.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Appends an entry. The caller checks `is_full` first.
    pub fn push(&mut self, fetched: FetchedInst) {
        debug_assert!(!self.is_full(), "fetch queue overflow");
        self.entries.push_back(fetched);
    }

    /// Oldest entry.
    pub fn front(&self) -> Option<&FetchedInst> {
        self.entries.front()
    }

    /// Removes the oldest entry.
    pub fn pop_front(&mut self) -> Option<FetchedInst> {
        self.entries.pop_front()
    }

    /// PC of the oldest entry.
    pub fn oldest_pc(&self) -> Option<u64> {
        self.front().map(|f| f.pc)
    }

    /// Discards every entry and returns how many were dropped.
    pub fn drain(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Changes the capacity of an empty queue.
    pub fn resize(&mut self, capacity: usize) {
        assert!(self.is_empty(), "resizing a non-empty fetch queue");
        self.capacity = capacity;
        self.entries.reserve(capacity);
    }
}
