// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A generic priority queue, grounded on the `BinaryHeap`-based
//! `PriorityWorkQueue` in the teacher's `src/engine/priority_work_queue.rs`
//! and on the wrapper-class pattern of `wolfe/scheduler/_job_queue.py`.
//!
//! Callers supply the ordering by wrapping their payload in a type that
//! implements `Ord` the way they want it popped — see
//! `scheduler::group::QueuedJob` and `scheduler::delayed::DelayedSlot` for
//! the two orderings this engine needs.

use std::collections::BinaryHeap;

/// A priority queue over any `Ord` wrapper type. `std::collections::BinaryHeap`
/// is a max-heap, so "pops first" means "compares greatest" — each wrapper's
/// `Ord` impl encodes that directly rather than relying on `Reverse`.
#[derive(Debug)]
pub struct JobQueue<T: Ord> {
    heap: BinaryHeap<T>,
}

impl<T: Ord> JobQueue<T> {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new() }
    }

    pub fn put(&mut self, item: T) {
        self.heap.push(item);
    }

    pub fn get(&mut self) -> Option<T> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.heap.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<T: Ord> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Iterator for JobQueue<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[derive(Debug, PartialEq, Eq)]
    struct Item(i64);

    impl PartialOrd for Item {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for Item {
        fn cmp(&self, other: &Self) -> Ordering {
            // smallest value pops first
            other.0.cmp(&self.0)
        }
    }

    #[test]
    fn empty_queue_peeks_and_gets_none() {
        let q: JobQueue<Item> = JobQueue::new();
        assert!(q.peek().is_none());
    }

    #[test]
    fn pops_in_ord_defined_priority() {
        let mut q = JobQueue::new();
        q.put(Item(3));
        q.put(Item(1));
        q.put(Item(2));
        assert_eq!(q.get(), Some(Item(1)));
        assert_eq!(q.get(), Some(Item(2)));
        assert_eq!(q.get(), Some(Item(3)));
        assert!(q.get().is_none());
    }

    #[test]
    fn iterator_drains_the_queue_in_priority_order() {
        let mut q = JobQueue::new();
        q.put(Item(2));
        q.put(Item(1));
        let drained: Vec<_> = q.collect();
        assert_eq!(drained, vec![Item(1), Item(2)]);
    }
}
