//! Deadline queue for staggered work.
//!
//! Items are polled once per frame against a caller-owned clock; nothing here
//! spawns threads or touches wall time. Each item carries the session it was
//! scheduled in so the owner can drop work that outlived a mode toggle.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One scheduled item.
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred<T> {
    /// Clock time at which the item becomes due.
    pub due: f64,
    /// Session the item was scheduled in.
    pub session: u64,
    /// What to do.
    pub action: T,
}

#[derive(Debug)]
struct Entry<T> {
    seq: u64,
    item: Deferred<T>,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // BinaryHeap is a max-heap: earliest due, then earliest inserted, sorts highest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .item
            .due
            .total_cmp(&self.item.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-deadline queue with FIFO order among equal deadlines.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` to become due at `due`.
    pub fn schedule(&mut self, due: f64, session: u64, action: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            seq,
            item: Deferred {
                due,
                session,
                action,
            },
        });
    }

    /// Remove and return the earliest item with `due <= now`.
    pub fn pop_due(&mut self, now: f64) -> Option<Deferred<T>> {
        if self.heap.peek()?.item.due <= now {
            self.heap.pop().map(|entry| entry.item)
        } else {
            None
        }
    }

    /// Deadline of the next item.
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.item.due)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
