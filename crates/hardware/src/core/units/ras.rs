//! Return Address Stack (RAS).
//!
//! The RAS predicts function return targets. Fetch pushes on calls and pops on
//! returns speculatively; every fetched instruction records the stack pointer
//! it saw so a misprediction rollback can rewind the stack to that point.

/// Return-address predictor with a speculative checkpoint/recover pair.
pub trait ReturnAddressStack {
    /// Pushes a return address.
    ///
    /// # Arguments
    ///
    /// * `addr` - The return address to push.
    fn push(&mut self, addr: u64);

    /// Pops the predicted return address.
    fn pop(&mut self) -> u64;

    /// Returns the current top-of-stack index.
    fn checkpoint(&self) -> usize;

    /// Rewinds the top-of-stack index to a value returned by `checkpoint`.
    fn recover(&mut self, idx: usize);
}

/// Circular return address stack.
///
/// Overflow wraps and overwrites the oldest entry; underflow wraps and returns
/// whatever the slot holds. Recovery restores only the top-of-stack pointer,
/// so entries overwritten on a wrong path stay overwritten.
#[derive(Clone, Debug)]
pub struct Ras {
    /// The stack storage.
    stack: Vec<u64>,
    /// Index of the top entry.
    tos: usize,
}

impl Ras {
    /// Creates a stack with `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            stack: vec![0; capacity.max(1)],
            tos: 0,
        }
    }

    /// Number of entries.
    pub const fn capacity(&self) -> usize {
        self.stack.len()
    }

    /// Peeks at the predicted return address without popping.
    pub fn top(&self) -> u64 {
        self.stack[self.tos]
    }
}

impl ReturnAddressStack for Ras {
    fn push(&mut self, addr: u64) {
        self.tos = (self.tos + 1) % self.stack.len();
        self.stack[self.tos] = addr;
    }

    fn pop(&mut self) -> u64 {
        let addr = self.stack[self.tos];
        self.tos = (self.tos + self.stack.len() - 1) % self.stack.len();
        addr
    }

    fn checkpoint(&self) -> usize {
        self.tos
    }

    fn recover(&mut self, idx: usize) {
        assert!(idx < self.stack.len(), "RAS recover index {idx} out of range");
        self.tos = idx;
    }
}
