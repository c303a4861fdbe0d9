//! Circular entry arena used for both the ROB and the LSQ.
//!
//! The buffer is a fixed-capacity ring addressed by `head`/`tail`. It provides:
//! 1. **Program-Order Allocation:** `push_tail` appends at `tail`.
//! 2. **In-order Commit:** `pop_head` retires from `head`.
//! 3. **Rollback:** `pop_tail` removes the youngest entry, working backward.
//! 4. **Stable Handles:** Every slot carries a generation bumped on reuse, so an
//!    `EntryHandle` held by a wakeup queue resolves to "absent" once its entry
//!    has been committed or squashed.
//!
//! Capacity only changes while the buffer is empty, at context admission.

use crate::core::pipeline::entry::InflightEntry;

/// Generation-checked reference to a buffer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryHandle {
    index: u32,
    generation: u64,
}

impl EntryHandle {
    /// Creates a handle from raw parts.
    pub const fn new(index: usize, generation: u64) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }

    /// Slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Slot generation at the time the handle was issued.
    #[inline]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u64,
    entry: Option<InflightEntry>,
}

/// Fixed-capacity circular buffer of in-flight entries.
#[derive(Clone, Debug, Default)]
pub struct EntryBuffer {
    slots: Vec<Slot>,
    /// Index of the oldest entry.
    head: usize,
    /// Index where the next entry will be placed.
    tail: usize,
    /// Number of live entries.
    len: usize,
}

impl EntryBuffer {
    /// Creates an empty buffer with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, Slot::default);
        Self {
            slots,
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the buffer is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Index of the oldest entry.
    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Index the next entry will occupy.
    #[inline]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    /// Changes the capacity of an empty buffer.
    ///
    /// Generations keep increasing across the resize so that handles issued
    /// before it stay stale.
    pub fn resize(&mut self, capacity: usize) {
        assert!(self.is_empty(), "resizing a non-empty buffer");
        let floor = self.slots.iter().map(|s| s.generation).max().unwrap_or(0);
        self.slots = (0..capacity)
            .map(|_| Slot {
                generation: floor,
                entry: None,
            })
            .collect();
        self.head = 0;
        self.tail = 0;
    }

    /// Resets `head` and `tail` to 0. The buffer must already be empty.
    pub fn reset(&mut self) {
        assert!(self.is_empty(), "resetting a non-empty buffer");
        self.head = 0;
        self.tail = 0;
    }

    #[inline]
    fn prev(&self, idx: usize) -> usize {
        (idx + self.slots.len() - 1) % self.slots.len()
    }

    #[inline]
    fn next(&self, idx: usize) -> usize {
        (idx + 1) % self.slots.len()
    }

    /// Appends an entry at `tail`. The caller checks `is_full` first.
    pub fn push_tail(&mut self, entry: InflightEntry) -> EntryHandle {
        assert!(!self.is_full(), "push into a full buffer");
        let idx = self.tail;
        let slot = &mut self.slots[idx];
        slot.generation += 1;
        slot.entry = Some(entry);
        let handle = EntryHandle::new(idx, slot.generation);
        self.tail = self.next(idx);
        self.len += 1;
        handle
    }

    /// Removes the oldest entry.
    pub fn pop_head(&mut self) -> Option<(EntryHandle, InflightEntry)> {
        if self.len == 0 {
            return None;
        }
        let idx = self.head;
        let slot = &mut self.slots[idx];
        let entry = slot.entry.take()?;
        let handle = EntryHandle::new(idx, slot.generation);
        self.head = self.next(idx);
        self.len -= 1;
        Some((handle, entry))
    }

    /// Removes the youngest entry.
    pub fn pop_tail(&mut self) -> Option<(EntryHandle, InflightEntry)> {
        if self.len == 0 {
            return None;
        }
        let idx = self.prev(self.tail);
        let slot = &mut self.slots[idx];
        let entry = slot.entry.take()?;
        let handle = EntryHandle::new(idx, slot.generation);
        self.tail = idx;
        self.len -= 1;
        Some((handle, entry))
    }

    /// Handle of the oldest entry.
    pub fn head_handle(&self) -> Option<EntryHandle> {
        (self.len > 0).then(|| self.handle_at(self.head))
    }

    /// Handle of the youngest entry.
    pub fn tail_handle(&self) -> Option<EntryHandle> {
        (self.len > 0).then(|| self.handle_at(self.prev(self.tail)))
    }

    fn handle_at(&self, idx: usize) -> EntryHandle {
        EntryHandle::new(idx, self.slots[idx].generation)
    }

    /// Resolves a handle; `None` if the entry is gone.
    pub fn get(&self, handle: EntryHandle) -> Option<&InflightEntry> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation == handle.generation {
            slot.entry.as_ref()
        } else {
            None
        }
    }

    /// Resolves a handle mutably; `None` if the entry is gone.
    pub fn get_mut(&mut self, handle: EntryHandle) -> Option<&mut InflightEntry> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation == handle.generation {
            slot.entry.as_mut()
        } else {
            None
        }
    }

    /// Returns true if the handle still names a live entry.
    pub fn contains(&self, handle: EntryHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Iterates live entries from head (oldest) to tail (youngest).
    pub fn iter(&self) -> impl Iterator<Item = (EntryHandle, &InflightEntry)> + '_ {
        let cap = self.slots.len();
        (0..self.len).filter_map(move |i| {
            let idx = (self.head + i) % cap;
            let slot = &self.slots[idx];
            slot.entry
                .as_ref()
                .map(|e| (EntryHandle::new(idx, slot.generation), e))
        })
    }
}
