// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The engine's core state machine, grounded on
//! `wolfe/scheduler/_scheduler.py::Scheduler`.
//!
//! `Scheduler` is synchronous and single-threaded by construction: every
//! public method runs to completion without yielding. The async
//! concurrency story lives one layer up, in `scheduler::engine::Engine`,
//! which serializes calls into this type behind a `tokio::sync::Mutex`
//! (`SPEC_FULL.md` section 5).

use std::collections::{HashMap, HashSet};

use crate::errors::WolfeError;
use crate::execution::{Attempt, Executor, JobResult};
use crate::junk_yard::JunkYard;
use crate::observability::messages::scheduler::{
    DelayedQueueDrained, JobDelayed, JobDispatched, JobFailed, JobFailedDependentsStuck, JobFinished, JobReady,
    JobWaiting, LockAcquired, LockReleased, TodoEntered,
};
use crate::observability::messages::StructuredLog;
use crate::scheduler::delayed::DelayedQueue;
use crate::scheduler::graph;
use crate::scheduler::group::Group;
use crate::scheduler::job::{Job, JobId};
use crate::scheduler::locks::Locks;
use crate::scheduler::todo::Todo;
use crate::scheduler::util::{scheduled_time, Clock, DEFAULT_GROUP};
use crate::scheduler::waiting::Waiting;

/// The engine's full mutable state. See the module docs for the
/// concurrency story around this type.
pub struct Scheduler {
    jobs: HashMap<i64, Job>,
    executing: HashMap<i64, Attempt>,
    executors: HashMap<String, i64>,
    delayed: DelayedQueue,
    waiting: Waiting,
    locks: Locks,
    failed: HashSet<i64>,
    groups: HashMap<String, Group>,
    next_job_id: i64,
    clock: Box<dyn Clock>,
    junk_yard: Box<dyn JunkYard>,
}

impl Scheduler {
    pub fn new(clock: Box<dyn Clock>, junk_yard: Box<dyn JunkYard>) -> Self {
        Self {
            jobs: HashMap::new(),
            executing: HashMap::new(),
            executors: HashMap::new(),
            delayed: DelayedQueue::new(),
            waiting: Waiting::new(),
            locks: Locks::new(),
            failed: HashSet::new(),
            groups: HashMap::new(),
            next_job_id: 1,
            clock,
            junk_yard,
        }
    }

    /// `0 < job_id <= last assigned id, and no longer (or never) present
    /// in the job store` — true for finished jobs, false for everything
    /// else, including jobs that failed (they stay resident forever; see
    /// Open Question 2 in `DESIGN.md`).
    pub fn is_done(&self, job_id: i64) -> bool {
        job_id > 0 && job_id < self.next_job_id && !self.jobs.contains_key(&job_id)
    }

    pub fn execution_attempt(&self, job_id: i64) -> Option<&Attempt> {
        self.executing.get(&job_id)
    }

    pub fn has_failed(&self, job_id: i64) -> bool {
        self.failed.contains(&job_id)
    }

    fn del_group_if_empty(&mut self, name: &str) {
        if self.groups.get(name).is_some_and(Group::is_empty) {
            self.groups.remove(name);
        }
    }

    /// Linearize `todo` into jobs and enter every one of them. All-or-
    /// nothing: a cycle anywhere in the graph leaves no trace and consumes
    /// no ids.
    pub fn enter_todo(&mut self, todo: &Todo) -> Result<JobId, WolfeError> {
        let jobs = graph::linearize(todo, &mut self.next_job_id)?;
        let job_count = jobs.len();
        let root_id = jobs[0].id;

        for job in jobs {
            self.enter_job(job);
        }

        TodoEntered { root_job_id: root_id.0 as u64, job_count }.log();
        Ok(root_id)
    }

    fn enter_job(&mut self, job: Job) {
        let now = self.clock.now();
        let scheduled = scheduled_time(&job.not_before, now);
        let job_id = job.id.0;
        let not_before = job.not_before.clone();
        self.jobs.insert(job_id, job);

        if scheduled > now {
            self.delayed.put(job_id, &not_before, now);
            JobDelayed { job_id: job_id as u64, scheduled_time: scheduled }.log();
        } else {
            self.enter_undelayed(job_id);
        }
    }

    fn enter_undelayed(&mut self, job_id: i64) {
        let predecessors = self.jobs[&job_id].predecessors.clone();
        let next_job_id = self.next_job_id;
        let done: HashSet<i64> = predecessors
            .into_iter()
            .filter(|&p| p > 0 && p < next_job_id && !self.jobs.contains_key(&p))
            .collect();

        let must_wait = self.waiting.put(job_id, &mut self.jobs, |p| done.contains(&p));
        if must_wait {
            let predecessors_waiting = self.jobs[&job_id].predecessors_waiting.unwrap_or(0);
            JobWaiting { job_id: job_id as u64, predecessors_waiting }.log();
        } else {
            self.schedule_independent(job_id);
        }
    }

    fn schedule_independent(&mut self, job_id: i64) {
        self.locks.enter(job_id, &mut self.jobs);
        let group_name = self.jobs[&job_id].group.clone();
        let group = self.groups.entry(group_name.clone()).or_default();
        if group.schedule(job_id, &mut self.jobs, &mut self.locks) {
            for lock in &self.jobs[&job_id].locks {
                LockAcquired { job_id: job_id as u64, lock_name: &lock.name }.log();
            }
            JobReady { job_id: job_id as u64, group: &group_name }.log();
        }
    }

    fn undelay_jobs(&mut self) {
        let now = self.clock.now();
        let ready = self.delayed.drain_ready(now);
        DelayedQueueDrained { count: ready.len() }.log();
        for job_id in ready {
            self.enter_undelayed(job_id);
        }
    }

    /// Jobs freed by a predecessor finishing are scheduled in the same
    /// priority order they'd be dispatched in, so a burst of unblocked
    /// work doesn't get handed out in an arbitrary order.
    fn unwait_jobs(&mut self, finished_id: i64) {
        let freed = self.waiting.free(finished_id, &mut self.jobs);
        let mut by_priority: Vec<(i64, i64)> =
            freed.into_iter().map(|id| (id, self.jobs[&id].importance)).collect();
        by_priority.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (job_id, _) in by_priority {
            self.schedule_independent(job_id);
        }
    }

    /// Hand out the next runnable job to `executor`. Re-requesting with an
    /// executor uid that already has an outstanding assignment returns
    /// that same assignment again (idempotent re-request, `spec.md`
    /// section 4.6) instead of handing out a second job.
    pub fn request_job(&mut self, executor: &Executor) -> Option<Job> {
        if let Some(&job_id) = self.executors.get(&executor.uid) {
            debug_assert!(self.executing.contains_key(&job_id));
            debug_assert!(self.jobs.contains_key(&job_id));
            return Some(self.jobs[&job_id].clone());
        }

        self.undelay_jobs();

        let groups: Vec<String> = match &executor.groups {
            Some(names) => names.clone(),
            None => vec![DEFAULT_GROUP.to_string()],
        };

        // First group in the executor's declared order wins a tie — see
        // Open Question 3 in `DESIGN.md`. In practice job ids are unique
        // across the whole engine, so "ties" only ever arise as "is this
        // candidate strictly better", never an actual draw.
        let mut found: Option<(i64, i64, String)> = None;
        for group_name in &groups {
            let Some(group) = self.groups.get(group_name) else { continue };
            let Some(candidate_id) = group.peek() else { continue };
            let candidate_importance = self.jobs[&candidate_id].importance;
            let better = match &found {
                None => true,
                Some((found_id, found_importance, _)) => {
                    candidate_importance > *found_importance
                        || (candidate_importance == *found_importance && candidate_id < *found_id)
                }
            };
            if better {
                found = Some((candidate_id, candidate_importance, group_name.clone()));
            }
        }

        let (job_id, _, group_name) = found?;
        let group = self.groups.get_mut(&group_name).expect("group located during the scan above");
        let popped = group.get();
        debug_assert_eq!(popped, Some(job_id));
        self.del_group_if_empty(&group_name);

        let now = self.clock.now();
        self.executing.insert(job_id, executor.attempt(now));
        self.executors.insert(executor.uid.clone(), job_id);

        JobDispatched { job_id: job_id as u64, group: &group_name, executor_uid: &executor.uid }.log();
        Some(self.jobs[&job_id].clone())
    }

    /// Record the outcome of an execution attempt. Releases the job's
    /// locks, then either archives it (success — handed to the junk yard
    /// and its dependents un-waited) or marks it failed (its dependents
    /// stay waiting forever).
    pub fn finish_job(&mut self, job_id: i64, executor_uid: &str, result: JobResult) -> Result<(), WolfeError> {
        let attempt = self
            .executing
            .get(&job_id)
            .ok_or(WolfeError::JobNotFound(JobId(job_id)))?;
        if attempt.executor_uid != executor_uid {
            return Err(WolfeError::InvalidExecutor {
                job_id: JobId(job_id),
                executor_uid: executor_uid.to_string(),
            });
        }

        let end = self.clock.now();
        let mut attempt = self.executing.remove(&job_id).expect("checked above");
        self.executors.remove(executor_uid);

        let lock_names: Vec<String> = self.jobs[&job_id].locks.iter().map(|l| l.name.clone()).collect();
        let released = self.locks.release(job_id, &mut self.jobs);
        for lock_name in &lock_names {
            LockReleased { job_id: job_id as u64, lock_name, freed_candidates: released.len() }.log();
        }

        let mut by_priority: Vec<(i64, i64)> =
            released.into_iter().map(|id| (id, self.jobs[&id].importance)).collect();
        by_priority.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (released_id, _) in by_priority {
            let group_name = self.jobs[&released_id].group.clone();
            let group = self.groups.entry(group_name.clone()).or_default();
            if group.schedule(released_id, &mut self.jobs, &mut self.locks) {
                for lock in &self.jobs[&released_id].locks {
                    LockAcquired { job_id: released_id as u64, lock_name: &lock.name }.log();
                }
                JobReady { job_id: released_id as u64, group: &group_name }.log();
            }
        }

        let failed = result.failed;
        let exit_code = result.exit_code;
        attempt.finish(end, result);
        self.jobs.get_mut(&job_id).expect("finishing job must still be resident").attempts.push(attempt);

        if failed {
            self.failed.insert(job_id);
            JobFailed { job_id: job_id as u64, exit_code }.log();
            let dependent_count = self.waiting.dependents_of(job_id);
            if dependent_count > 0 {
                JobFailedDependentsStuck { job_id: job_id as u64, dependent_count }.log();
            }
        } else {
            let job = self.jobs.remove(&job_id).expect("finishing job must still be resident");
            JobFinished { job_id: job_id as u64 }.log();
            self.unwait_jobs(job_id);
            self.junk_yard.put(job);
        }

        Ok(())
    }
}
