// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-group priority queues, grounded on `wolfe/scheduler/_group.py` and
//! the ordering in `wolfe/scheduler/_util.py::QueuedJob`.
//!
//! A job only ever enters a group's queue once every lock it declared is
//! acquired — `schedule` both claims the locks and enqueues in the same
//! call, so the queue never holds a job that isn't actually runnable.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::scheduler::job::Job;
use crate::scheduler::job_queue::JobQueue;
use crate::scheduler::locks::Locks;

/// A job id ordered by descending importance, then ascending id — higher
/// importance runs first; among equally important jobs, the one entered
/// first (lowest id) runs first.
struct QueuedJob {
    job_id: i64,
    importance: i64,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.importance == other.importance && self.job_id == other.job_id
    }
}
impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.importance.cmp(&other.importance).then_with(|| other.job_id.cmp(&self.job_id))
    }
}

/// One named group's ready queue.
#[derive(Default)]
pub struct Group {
    queue: JobQueue<QueuedJob>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `job_id`'s locks and enqueue it. Returns `false` without
    /// enqueuing if the job still has contested locks outstanding — the
    /// caller is expected to have only offered jobs whose locks are clear
    /// (`Locks::release` only returns fully-unblocked candidates), so this
    /// should never actually happen in practice.
    pub fn schedule(&mut self, job_id: i64, jobs: &mut HashMap<i64, Job>, locks: &mut Locks) -> bool {
        if jobs[&job_id].locks_waiting != Some(0) {
            return false;
        }
        let acquired = locks.acquire(job_id, jobs);
        debug_assert!(acquired, "lock inconsistency: job reached a group queue with unacquirable locks");
        let importance = jobs[&job_id].importance;
        self.queue.put(QueuedJob { job_id, importance });
        true
    }

    /// The id of the job that would be dispatched next, without removing it.
    pub fn peek(&self) -> Option<i64> {
        self.queue.peek().map(|q| q.job_id)
    }

    /// Remove and return the id of the next job to dispatch.
    pub fn get(&mut self) -> Option<i64> {
        self.queue.get().map(|q| q.job_id)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
