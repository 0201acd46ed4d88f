// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The delayed-job queue: jobs entered with a future `not_before` wait
//! here until their scheduled time arrives. Grounded on
//! `wolfe/scheduler/_util.py::DelayedJob` for the ordering and
//! `wolfe/scheduler/_scheduler.py::_undelay_jobs` for the drain logic.

use std::cmp::Ordering;

use crate::scheduler::job_queue::JobQueue;
use crate::scheduler::util::{scheduled_time, NotBefore};

/// A job waiting on its scheduled time, resolved once at insertion —
/// `not_before` is never re-evaluated against a later "now". Holds only
/// the job's id; `Scheduler::jobs` remains the canonical store.
struct DelayedSlot {
    job_id: i64,
    scheduled_time: i64,
}

impl PartialEq for DelayedSlot {
    fn eq(&self, other: &Self) -> bool {
        self.scheduled_time == other.scheduled_time
    }
}
impl Eq for DelayedSlot {}

impl PartialOrd for DelayedSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DelayedSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        // earliest scheduled time compares greatest, so it pops first
        other.scheduled_time.cmp(&self.scheduled_time)
    }
}

/// A min-heap of not-yet-runnable job ids, ordered by scheduled time.
#[derive(Default)]
pub struct DelayedQueue {
    queue: JobQueue<DelayedSlot>,
}

impl DelayedQueue {
    pub fn new() -> Self {
        Self { queue: JobQueue::new() }
    }

    /// Resolve `not_before` against `now` and enqueue `job_id`.
    pub fn put(&mut self, job_id: i64, not_before: &NotBefore, now: i64) {
        let scheduled = scheduled_time(not_before, now);
        self.queue.put(DelayedSlot { job_id, scheduled_time: scheduled });
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The earliest scheduled time still waiting, if any.
    pub fn peek_time(&self) -> Option<i64> {
        self.queue.peek().map(|slot| slot.scheduled_time)
    }

    /// Pop every job id whose scheduled time has arrived, earliest first.
    pub fn drain_ready(&mut self, now: i64) -> Vec<i64> {
        let mut ready = Vec::new();
        while let Some(true) = self.queue.peek().map(|slot| slot.scheduled_time <= now) {
            ready.push(self.queue.get().unwrap().job_id);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_ready_is_empty_before_scheduled_time() {
        let mut q = DelayedQueue::new();
        q.put(1, &NotBefore::In(100), 1_000);
        assert!(q.drain_ready(1_050).is_empty());
    }

    #[test]
    fn drain_ready_returns_job_once_time_arrives() {
        let mut q = DelayedQueue::new();
        q.put(1, &NotBefore::In(100), 1_000);
        let ready = q.drain_ready(1_100);
        assert_eq!(ready, vec![1]);
        assert!(q.is_empty());
    }

    #[test]
    fn drain_ready_orders_multiple_jobs_by_scheduled_time() {
        let mut q = DelayedQueue::new();
        q.put(1, &NotBefore::In(50), 1_000);
        q.put(2, &NotBefore::In(10), 1_000);
        let ready = q.drain_ready(1_100);
        assert_eq!(ready, vec![2, 1]);
    }

    #[test]
    fn peek_time_reflects_earliest_slot() {
        let mut q = DelayedQueue::new();
        assert!(q.peek_time().is_none());
        q.put(1, &NotBefore::In(50), 1_000);
        q.put(2, &NotBefore::In(10), 1_000);
        assert_eq!(q.peek_time(), Some(1_010));
    }
}
