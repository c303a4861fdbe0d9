//! Wakeup queues: the discrete-event scheduler of in-flight entries.
//!
//! Each context owns four queues of links to its ROB and LSQ entries:
//! 1. **waiting:** Operands not yet scheduled; re-examined at the key cycle.
//! 2. **issue:** Operands ready at the key cycle; walking toward FU issue.
//! 3. **event:** Execution finishes at the key cycle (writeback).
//! 4. **ready:** Program-order list keyed by sequence number (in-order issue only).
//!
//! A queue is a binary heap plus a membership table indexed by buffer slot.
//! Removal clears the membership entry in O(1); the heap item it leaves behind
//! is recognised as stale and skipped when it surfaces. Ties on the key are
//! broken by insertion order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::core::pipeline::buffer::EntryHandle;

/// Buffer a link points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferId {
    /// Reorder buffer.
    Rob,
    /// Load/store queue.
    Lsq,
}

/// Link from a wakeup queue to an in-flight entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueRef {
    /// Buffer holding the entry.
    pub buffer: BufferId,
    /// Slot handle within that buffer.
    pub handle: EntryHandle,
}

impl QueueRef {
    /// Link to a ROB entry.
    pub const fn rob(handle: EntryHandle) -> Self {
        Self {
            buffer: BufferId::Rob,
            handle,
        }
    }

    /// Link to an LSQ entry.
    pub const fn lsq(handle: EntryHandle) -> Self {
        Self {
            buffer: BufferId::Lsq,
            handle,
        }
    }
}

/// Ordering key of a queued link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeKey {
    /// Simulated cycle (waiting, issue and event queues).
    Cycle(u64),
    /// Dispatch sequence number (ready queue).
    Sequence(u64),
}

/// Which of the four queues this is; fixes the key variant it accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueKind {
    /// Operand wait.
    Waiting,
    /// Issue / execute.
    Issue,
    /// Event / writeback.
    Event,
    /// In-order ready list.
    Ready,
}

impl QueueKind {
    const fn key_of(self, key: WakeKey) -> u64 {
        match (self, key) {
            (Self::Ready, WakeKey::Sequence(k))
            | (Self::Waiting | Self::Issue | Self::Event, WakeKey::Cycle(k)) => k,
            _ => panic!("wake key variant does not match queue kind"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Member {
    generation: u64,
    stamp: u64,
}

/// One time- or sequence-ordered queue of links.
#[derive(Clone, Debug)]
pub struct WakeupQueue {
    kind: QueueKind,
    heap: BinaryHeap<Reverse<(u64, u64, QueueRef)>>,
    rob_members: Vec<Option<Member>>,
    lsq_members: Vec<Option<Member>>,
    next_stamp: u64,
    len: usize,
}

impl WakeupQueue {
    /// Creates an empty queue covering ROB and LSQ slot counts.
    pub fn new(kind: QueueKind, rob_slots: usize, lsq_slots: usize) -> Self {
        Self {
            kind,
            heap: BinaryHeap::new(),
            rob_members: vec![None; rob_slots],
            lsq_members: vec![None; lsq_slots],
            next_stamp: 0,
            len: 0,
        }
    }

    /// Queue kind.
    pub const fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Number of live links.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if no live link is queued.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn members(&self, buffer: BufferId) -> &[Option<Member>] {
        match buffer {
            BufferId::Rob => &self.rob_members,
            BufferId::Lsq => &self.lsq_members,
        }
    }

    fn member_mut(&mut self, link: QueueRef) -> &mut Option<Member> {
        let table = match link.buffer {
            BufferId::Rob => &mut self.rob_members,
            BufferId::Lsq => &mut self.lsq_members,
        };
        &mut table[link.handle.index()]
    }

    /// True if `link` is queued here.
    pub fn contains(&self, link: QueueRef) -> bool {
        self.members(link.buffer)
            .get(link.handle.index())
            .copied()
            .flatten()
            .is_some_and(|m| m.generation == link.handle.generation())
    }

    /// Queues `link` at `key`, replacing any earlier membership of the same slot.
    pub fn insert(&mut self, link: QueueRef, key: WakeKey) {
        let key = self.kind.key_of(key);
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        let member = self.member_mut(link);
        let was_member = member.is_some();
        *member = Some(Member {
            generation: link.handle.generation(),
            stamp,
        });
        if !was_member {
            self.len += 1;
        }
        self.heap.push(Reverse((key, stamp, link)));
    }

    /// Removes `link`; returns false if it was not queued.
    pub fn remove(&mut self, link: QueueRef) -> bool {
        if !self.contains(link) {
            return false;
        }
        *self.member_mut(link) = None;
        self.len -= 1;
        true
    }

    fn is_live(&self, stamp: u64, link: QueueRef) -> bool {
        self.members(link.buffer)
            .get(link.handle.index())
            .copied()
            .flatten()
            .is_some_and(|m| m.stamp == stamp && m.generation == link.handle.generation())
    }

    fn discard_stale(&mut self) {
        while let Some(&Reverse((_, stamp, link))) = self.heap.peek() {
            if self.is_live(stamp, link) {
                break;
            }
            let _ = self.heap.pop();
        }
    }

    fn take_top(&mut self) -> Option<(QueueRef, u64)> {
        let Reverse((key, _, link)) = self.heap.pop()?;
        *self.member_mut(link) = None;
        self.len -= 1;
        Some((link, key))
    }

    /// Pops the next link whose cycle is `<= now`, with its key.
    pub fn pop_due(&mut self, now: u64) -> Option<(QueueRef, u64)> {
        self.discard_stale();
        match self.heap.peek() {
            Some(Reverse((key, _, _))) if *key <= now => self.take_top(),
            _ => None,
        }
    }

    /// Peeks at the lowest-keyed link.
    pub fn peek_next(&mut self) -> Option<QueueRef> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((_, _, link))| *link)
    }

    /// Pops the lowest-keyed link regardless of key.
    pub fn pop_next(&mut self) -> Option<QueueRef> {
        self.discard_stale();
        self.take_top().map(|(link, _)| link)
    }

    /// Drops every link.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.rob_members.fill(None);
        self.lsq_members.fill(None);
        self.len = 0;
    }

    /// Empties the queue and re-sizes its membership tables.
    pub fn resize(&mut self, rob_slots: usize, lsq_slots: usize) {
        self.clear();
        self.rob_members = vec![None; rob_slots];
        self.lsq_members = vec![None; lsq_slots];
    }
}

/// The four wakeup queues of one context.
#[derive(Clone, Debug)]
pub struct WakeupQueues {
    /// Entries blocked on operand scheduling.
    pub waiting: WakeupQueue,
    /// Entries walking toward functional-unit issue.
    pub issue: WakeupQueue,
    /// Entries finishing execution.
    pub event: WakeupQueue,
    /// Program-order list for in-order issue.
    pub ready: WakeupQueue,
}

impl WakeupQueues {
    /// Creates empty queues for the given buffer sizes.
    pub fn new(rob_slots: usize, lsq_slots: usize) -> Self {
        Self {
            waiting: WakeupQueue::new(QueueKind::Waiting, rob_slots, lsq_slots),
            issue: WakeupQueue::new(QueueKind::Issue, rob_slots, lsq_slots),
            event: WakeupQueue::new(QueueKind::Event, rob_slots, lsq_slots),
            ready: WakeupQueue::new(QueueKind::Ready, rob_slots, lsq_slots),
        }
    }

    fn all_mut(&mut self) -> [&mut WakeupQueue; 4] {
        [
            &mut self.waiting,
            &mut self.issue,
            &mut self.event,
            &mut self.ready,
        ]
    }

    /// Removes `link` from all four queues; absent links are ignored.
    pub fn remove_all(&mut self, link: QueueRef) {
        for queue in self.all_mut() {
            let _ = queue.remove(link);
        }
    }

    /// True if `link` is in any queue.
    pub fn contains(&self, link: QueueRef) -> bool {
        [&self.waiting, &self.issue, &self.event, &self.ready]
            .iter()
            .any(|q| q.contains(link))
    }

    /// Total live links across the four queues.
    pub const fn len(&self) -> usize {
        self.waiting.len() + self.issue.len() + self.event.len() + self.ready.len()
    }

    /// True if all four queues are empty.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every link.
    pub fn clear(&mut self) {
        for queue in self.all_mut() {
            queue.clear();
        }
    }

    /// Re-sizes all four queues; they must be empty.
    pub fn resize(&mut self, rob_slots: usize, lsq_slots: usize) {
        for queue in self.all_mut() {
            debug_assert!(queue.is_empty());
            queue.resize(rob_slots, lsq_slots);
        }
    }
}
