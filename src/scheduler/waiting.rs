// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Jobs blocked on predecessors that haven't finished yet, grounded on
//! `wolfe/scheduler/_waiting.py`.
//!
//! Like `scheduler::locks::Locks`, this type only ever deals in job ids —
//! `Scheduler::jobs` is the canonical store, passed in by every caller.

use std::collections::{HashMap, HashSet};

use crate::scheduler::job::Job;

#[derive(Default)]
pub struct Waiting {
    waiting: HashSet<i64>,
    waiting_for: HashMap<i64, HashSet<i64>>,
}

impl Waiting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job_id`'s predecessors. Returns `true` if the job must
    /// wait (at least one predecessor is still outstanding), `false` if
    /// it's immediately schedulable.
    pub fn put(&mut self, job_id: i64, jobs: &mut HashMap<i64, Job>, is_done: impl Fn(i64) -> bool) -> bool {
        let predecessors = jobs[&job_id].predecessors.clone();
        let mut waiting_count = predecessors.len();
        for &pred in &predecessors {
            if !is_done(pred) {
                self.waiting_for.entry(pred).or_default().insert(job_id);
            } else {
                waiting_count -= 1;
            }
        }
        jobs.get_mut(&job_id).unwrap().predecessors_waiting = Some(waiting_count);

        if waiting_count == 0 {
            return false;
        }
        self.waiting.insert(job_id);
        true
    }

    /// Release every job whose only remaining wait was on `finished_id`.
    /// Jobs still blocked on other predecessors stay in the waiting set
    /// with their count decremented.
    pub fn free(&mut self, finished_id: i64, jobs: &mut HashMap<i64, Job>) -> Vec<i64> {
        debug_assert!(!self.waiting.contains(&finished_id));
        let mut freed = Vec::new();
        for job_id in self.waiting_for.remove(&finished_id).unwrap_or_default() {
            let job = jobs.get_mut(&job_id).expect("waiting job must still be tracked");
            let remaining = job.predecessors_waiting.unwrap_or(0).saturating_sub(1);
            job.predecessors_waiting = Some(remaining);
            if remaining == 0 {
                freed.push(job_id);
                self.waiting.remove(&job_id);
            }
        }
        freed
    }

    pub fn is_waiting(&self, job_id: i64) -> bool {
        self.waiting.contains(&job_id)
    }

    /// How many jobs are currently blocked waiting on `job_id` to finish.
    /// Read-only: unlike `free`, this never releases anything, which is
    /// exactly what's needed to report a failed job's stuck dependents
    /// without pretending they've been unblocked.
    pub fn dependents_of(&self, job_id: i64) -> usize {
        self.waiting_for.get(&job_id).map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::job::JobId;
    use crate::scheduler::util::NotBefore;

    fn insert_job(jobs: &mut HashMap<i64, Job>, id: i64, predecessors: Vec<i64>) {
        let job =
            Job::new(JobId(id), "j", "default", vec![], 0, NotBefore::Now, Default::default(), predecessors)
                .unwrap();
        jobs.insert(id, job);
    }

    #[test]
    fn job_with_no_predecessors_does_not_wait() {
        let mut w = Waiting::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 1, vec![]);
        assert!(!w.put(1, &mut jobs, |_| false));
        assert!(!w.is_waiting(1));
    }

    #[test]
    fn job_with_finished_predecessor_does_not_wait() {
        let mut w = Waiting::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 2, vec![1]);
        assert!(!w.put(2, &mut jobs, |_| true));
    }

    #[test]
    fn job_with_outstanding_predecessor_waits() {
        let mut w = Waiting::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 2, vec![1]);
        assert!(w.put(2, &mut jobs, |_| false));
        assert!(w.is_waiting(2));
    }

    #[test]
    fn freeing_a_predecessor_unblocks_only_jobs_with_no_other_wait() {
        let mut w = Waiting::new();
        let mut jobs = HashMap::new();
        insert_job(&mut jobs, 3, vec![1, 2]);
        w.put(3, &mut jobs, |_| false);

        assert!(w.free(1, &mut jobs).is_empty());
        assert!(w.is_waiting(3));

        let freed = w.free(2, &mut jobs);
        assert_eq!(freed, vec![3]);
        assert!(!w.is_waiting(3));
    }
}
