//! Bounded snapshot FIFO with overwrite-oldest semantics
//!
//! Used between stages that run on the same UI-rate thread (analyzer to
//! path builder, path builder to renderer). Pushing never blocks and never
//! fails: when full, the oldest entry is dropped.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct SnapshotFifo<T> {
    entries: VecDeque<T>,
    capacity: usize,
    dropped: u64,
}

impl<T> SnapshotFifo<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append, discarding the oldest entry when full
    pub fn push(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(entry);
    }

    /// Oldest entry
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    /// Drain everything, returning only the most recent entry
    pub fn take_latest(&mut self) -> Option<T> {
        let latest = self.entries.pop_back();
        self.entries.clear();
        latest
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total entries discarded by overflow since construction
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut fifo = SnapshotFifo::new(4);
        fifo.push(1);
        fifo.push(2);
        assert_eq!(fifo.pop(), Some(1));
        assert_eq!(fifo.pop(), Some(2));
        assert_eq!(fifo.pop(), None);
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut fifo = SnapshotFifo::new(3);
        for i in 0..5 {
            fifo.push(i);
        }
        assert_eq!(fifo.len(), 3);
        assert_eq!(fifo.dropped(), 2);
        assert_eq!(fifo.pop(), Some(2));
    }

    #[test]
    fn test_take_latest() {
        let mut fifo = SnapshotFifo::new(8);
        fifo.push("a");
        fifo.push("b");
        fifo.push("c");
        assert_eq!(fifo.take_latest(), Some("c"));
        assert!(fifo.is_empty());
        assert_eq!(fifo.take_latest(), None);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut fifo = SnapshotFifo::new(0);
        fifo.push(1);
        fifo.push(2);
        assert_eq!(fifo.capacity(), 1);
        assert_eq!(fifo.pop(), Some(2));
    }
}
