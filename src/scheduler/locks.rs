// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The lock manager: tracks which job holds each named exclusion lock and
//! which jobs are queued behind it. Grounded on `wolfe/scheduler/_locks.py`.
//!
//! All locks are exclusive (`scheduler::lock::validate` rejects any other
//! kind at the boundary), so this manager only ever needs to track a
//! single holder per name.
//!
//! Unlike the Python source, which threads a live `Job` reference through
//! every call, this manager only ever sees job ids — `Scheduler::jobs` is
//! the single canonical store, and every method here takes it as a
//! parameter rather than holding its own pointer into it. This keeps the
//! borrow checker in the loop about exactly which jobs get mutated where.

use std::collections::{HashMap, HashSet};

use crate::scheduler::job::Job;

#[derive(Default)]
pub struct Locks {
    /// jobs blocked behind a lock someone else holds
    waiting: HashMap<String, HashSet<i64>>,
    /// jobs that still need to acquire a lock nobody holds yet
    free: HashMap<String, HashSet<i64>>,
    /// lock name -> the job id currently holding it
    acquired: HashMap<String, i64>,
}

impl Locks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job_id`'s locks, sorting it into `free` or `waiting` per
    /// name depending on whether the lock is currently held. Sets
    /// `locks_waiting` on the job to the number of locks still contested.
    pub fn enter(&mut self, job_id: i64, jobs: &mut HashMap<i64, Job>) {
        let locks = jobs[&job_id].locks.clone();
        let mut waiting_count = locks.len();
        for lock in &locks {
            debug_assert!(lock.exclusive, "non-exclusive locks must be rejected before entering the engine");
            if self.acquired.contains_key(&lock.name) {
                self.waiting.entry(lock.name.clone()).or_default().insert(job_id);
            } else {
                self.free.entry(lock.name.clone()).or_default().insert(job_id);
                waiting_count -= 1;
            }
        }
        jobs.get_mut(&job_id).unwrap().locks_waiting = Some(waiting_count);
    }

    /// Attempt to acquire every lock `job_id` declared. Fails only if the
    /// job still has contested locks outstanding.
    pub fn acquire(&mut self, job_id: i64, jobs: &mut HashMap<i64, Job>) -> bool {
        let (locks, locks_waiting) = {
            let job = &jobs[&job_id];
            (job.locks.clone(), job.locks_waiting)
        };
        if locks_waiting.unwrap_or(0) != 0 {
            return false;
        }
        for lock in &locks {
            debug_assert!(!self.acquired.contains_key(&lock.name));
            let mut free = self.free.remove(&lock.name).unwrap_or_default();
            free.remove(&job_id);
            if !free.is_empty() {
                for &other_id in &free {
                    if let Some(other) = jobs.get_mut(&other_id) {
                        other.locks_waiting = Some(other.locks_waiting.unwrap_or(0) + 1);
                    }
                }
                self.waiting.insert(lock.name.clone(), free);
            }
            self.acquired.insert(lock.name.clone(), job_id);
        }
        true
    }

    /// Release every lock `job_id` holds, returning the ids of jobs that
    /// became fully unblocked (all of their locks now acquirable).
    pub fn release(&mut self, job_id: i64, jobs: &mut HashMap<i64, Job>) -> Vec<i64> {
        let locks = jobs[&job_id].locks.clone();
        debug_assert_eq!(jobs[&job_id].locks_waiting, Some(0));
        let mut candidates = HashSet::new();
        for lock in &locks {
            debug_assert_eq!(self.acquired.get(&lock.name), Some(&job_id));
            self.acquired.remove(&lock.name);
            if let Some(waiting) = self.waiting.remove(&lock.name) {
                for &other_id in &waiting {
                    if let Some(other) = jobs.get_mut(&other_id) {
                        let remaining = other.locks_waiting.unwrap_or(0).saturating_sub(1);
                        other.locks_waiting = Some(remaining);
                        if remaining == 0 {
                            candidates.insert(other_id);
                        }
                    }
                }
                self.free.insert(lock.name.clone(), waiting);
            }
        }
        let mut candidates: Vec<_> = candidates.into_iter().collect();
        candidates.sort_unstable();
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::job::JobId;
    use crate::scheduler::lock::Lock;
    use crate::scheduler::util::NotBefore;

    fn insert_job(jobs: &mut HashMap<i64, Job>, id: i64, locks: Vec<Lock>) {
        let job = Job::new(JobId(id), "j", "default", locks, 0, NotBefore::Now, Default::default(), vec![])
            .unwrap();
        jobs.insert(id, job);
    }

    #[test]
    fn job_with_no_locks_acquires_immediately() {
        let mut locks = Locks::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 1, vec![]);
        locks.enter(1, &mut jobs);
        assert_eq!(jobs[&1].locks_waiting, Some(0));
        assert!(locks.acquire(1, &mut jobs));
    }

    #[test]
    fn second_job_waits_behind_the_first() {
        let mut locks = Locks::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 1, vec![Lock::exclusive("x")]);
        locks.enter(1, &mut jobs);
        assert!(locks.acquire(1, &mut jobs));

        insert_job(&mut jobs, 2, vec![Lock::exclusive("x")]);
        locks.enter(2, &mut jobs);
        assert_eq!(jobs[&2].locks_waiting, Some(1));
        assert!(!locks.acquire(2, &mut jobs));
    }

    #[test]
    fn releasing_unblocks_the_waiter() {
        let mut locks = Locks::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 1, vec![Lock::exclusive("x")]);
        locks.enter(1, &mut jobs);
        locks.acquire(1, &mut jobs);

        insert_job(&mut jobs, 2, vec![Lock::exclusive("x")]);
        locks.enter(2, &mut jobs);

        let freed = locks.release(1, &mut jobs);
        assert_eq!(freed, vec![2]);
        assert_eq!(jobs[&2].locks_waiting, Some(0));
    }

    #[test]
    fn job_with_two_locks_waits_for_both_to_clear() {
        let mut locks = Locks::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 1, vec![Lock::exclusive("x")]);
        locks.enter(1, &mut jobs);
        locks.acquire(1, &mut jobs);

        insert_job(&mut jobs, 3, vec![Lock::exclusive("y")]);
        locks.enter(3, &mut jobs);
        locks.acquire(3, &mut jobs);

        insert_job(&mut jobs, 2, vec![Lock::exclusive("x"), Lock::exclusive("y")]);
        locks.enter(2, &mut jobs);
        assert_eq!(jobs[&2].locks_waiting, Some(2));

        assert!(locks.release(1, &mut jobs).is_empty());
        assert_eq!(jobs[&2].locks_waiting, Some(1));

        let freed = locks.release(3, &mut jobs);
        assert_eq!(freed, vec![2]);
        assert_eq!(jobs[&2].locks_waiting, Some(0));
    }
}
