//! Shared issue queue slot allocator.
//!
//! The issue queue bounds how many dispatched-but-unissued instructions a core
//! holds across all its contexts. Dispatch claims a slot for every ROB entry;
//! issue (or rollback) releases it.

/// Index of an occupied issue-queue slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IqSlot(u32);

/// Fixed-capacity slot allocator.
#[derive(Clone, Debug)]
pub struct IssueQueue {
    used: Vec<bool>,
    occupied: usize,
}

impl IssueQueue {
    /// Creates an empty queue of `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            used: vec![false; capacity],
            occupied: 0,
        }
    }

    /// Total slots.
    pub fn capacity(&self) -> usize {
        self.used.len()
    }

    /// Slots currently claimed.
    pub const fn occupied(&self) -> usize {
        self.occupied
    }

    /// True if no slot is free.
    pub fn is_full(&self) -> bool {
        self.occupied == self.used.len()
    }

    /// Claims a free slot.
    pub fn claim(&mut self) -> Option<IqSlot> {
        let idx = self.used.iter().position(|&u| !u)?;
        self.used[idx] = true;
        self.occupied += 1;
        Some(IqSlot(idx as u32))
    }

    /// Releases a claimed slot.
    pub fn release(&mut self, slot: IqSlot) {
        let used = &mut self.used[slot.0 as usize];
        assert!(*used, "issue queue slot {} released twice", slot.0);
        *used = false;
        self.occupied -= 1;
    }
}
