// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scheduler lifecycle and dispatch events.
//!
//! This module contains message types for logging events related to:
//! * Todo ingestion and job linearization
//! * Delayed/waiting/lock-queued state transitions
//! * Dispatch and completion of jobs

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A todo graph was linearized and entered into the job store.
///
/// # Log Level
/// `info!`
pub struct TodoEntered {
    pub root_job_id: u64,
    pub job_count: usize,
}

impl Display for TodoEntered {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Entered todo graph rooted at job {}: {} jobs linearized",
            self.root_job_id, self.job_count
        )
    }
}

impl StructuredLog for TodoEntered {
    fn log(&self) {
        tracing::info!(root_job_id = self.root_job_id, job_count = self.job_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("enter_todo", span_name = name, root_job_id = self.root_job_id, job_count = self.job_count)
    }
}

/// A job was placed in the delayed queue because `not_before` lies in the future.
///
/// # Log Level
/// `debug!`
pub struct JobDelayed {
    pub job_id: u64,
    pub scheduled_time: i64,
}

impl Display for JobDelayed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} delayed until {}", self.job_id, self.scheduled_time)
    }
}

impl StructuredLog for JobDelayed {
    fn log(&self) {
        tracing::debug!(job_id = self.job_id, scheduled_time = self.scheduled_time, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("delay", span_name = name, job_id = self.job_id)
    }
}

/// A job entered the waiting set because one or more predecessors are unfinished.
///
/// # Log Level
/// `debug!`
pub struct JobWaiting {
    pub job_id: u64,
    pub predecessors_waiting: usize,
}

impl Display for JobWaiting {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} waiting on {} predecessor(s)", self.job_id, self.predecessors_waiting)
    }
}

impl StructuredLog for JobWaiting {
    fn log(&self) {
        tracing::debug!(job_id = self.job_id, predecessors_waiting = self.predecessors_waiting, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("wait", span_name = name, job_id = self.job_id)
    }
}

/// A job acquired all of its declared locks and is ready for dispatch.
///
/// # Log Level
/// `debug!`
pub struct JobReady<'a> {
    pub job_id: u64,
    pub group: &'a str,
}

impl Display for JobReady<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} ready in group {:?}", self.job_id, self.group)
    }
}

impl StructuredLog for JobReady<'_> {
    fn log(&self) {
        tracing::debug!(job_id = self.job_id, group = self.group, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("ready", span_name = name, job_id = self.job_id, group = self.group)
    }
}

/// A job was handed out to an executor.
///
/// # Log Level
/// `info!`
pub struct JobDispatched<'a> {
    pub job_id: u64,
    pub group: &'a str,
    pub executor_uid: &'a str,
}

impl Display for JobDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatched job {} (group {:?}) to executor {:?}",
            self.job_id, self.group, self.executor_uid
        )
    }
}

impl StructuredLog for JobDispatched<'_> {
    fn log(&self) {
        tracing::info!(
            job_id = self.job_id,
            group = self.group,
            executor_uid = self.executor_uid,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dispatch",
            span_name = name,
            job_id = self.job_id,
            group = self.group,
            executor_uid = self.executor_uid,
        )
    }
}

/// A job finished successfully and was handed to the junk yard.
///
/// # Log Level
/// `info!`
pub struct JobFinished {
    pub job_id: u64,
}

impl Display for JobFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} finished successfully", self.job_id)
    }
}

impl StructuredLog for JobFinished {
    fn log(&self) {
        tracing::info!(job_id = self.job_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("finish", span_name = name, job_id = self.job_id)
    }
}

/// A job failed (non-zero exit code); it remains resident in the job store.
///
/// # Log Level
/// `warn!`
pub struct JobFailed {
    pub job_id: u64,
    pub exit_code: i32,
}

impl Display for JobFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} failed with exit code {}", self.job_id, self.exit_code)
    }
}

impl StructuredLog for JobFailed {
    fn log(&self) {
        tracing::warn!(job_id = self.job_id, exit_code = self.exit_code, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("fail", span_name = name, job_id = self.job_id, exit_code = self.exit_code)
    }
}

/// A failed job's dependents remain waiting forever (see Open Question 2 in
/// `DESIGN.md`): this design does not un-wait dependents of a failed job.
///
/// # Log Level
/// `warn!`
pub struct JobFailedDependentsStuck {
    pub job_id: u64,
    pub dependent_count: usize,
}

impl Display for JobFailedDependentsStuck {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job {} failed; {} dependent(s) remain waiting forever",
            self.job_id, self.dependent_count
        )
    }
}

impl StructuredLog for JobFailedDependentsStuck {
    fn log(&self) {
        tracing::warn!(job_id = self.job_id, dependent_count = self.dependent_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("dependents_stuck", span_name = name, job_id = self.job_id)
    }
}

/// A lock was acquired by a job.
///
/// # Log Level
/// `debug!`
pub struct LockAcquired<'a> {
    pub job_id: u64,
    pub lock_name: &'a str,
}

impl Display for LockAcquired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Job {} acquired lock {:?}", self.job_id, self.lock_name)
    }
}

impl StructuredLog for LockAcquired<'_> {
    fn log(&self) {
        tracing::debug!(job_id = self.job_id, lock_name = self.lock_name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("lock_acquired", span_name = name, job_id = self.job_id, lock_name = self.lock_name)
    }
}

/// A lock was released, possibly freeing waiters.
///
/// # Log Level
/// `debug!`
pub struct LockReleased<'a> {
    pub job_id: u64,
    pub lock_name: &'a str,
    pub freed_candidates: usize,
}

impl Display for LockReleased<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Job {} released lock {:?}, freeing {} candidate(s)",
            self.job_id, self.lock_name, self.freed_candidates
        )
    }
}

impl StructuredLog for LockReleased<'_> {
    fn log(&self) {
        tracing::debug!(
            job_id = self.job_id,
            lock_name = self.lock_name,
            freed_candidates = self.freed_candidates,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("lock_released", span_name = name, job_id = self.job_id, lock_name = self.lock_name)
    }
}

/// The delayed queue was drained up to the current time.
///
/// # Log Level
/// `debug!`
pub struct DelayedQueueDrained {
    pub count: usize,
}

impl Display for DelayedQueueDrained {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Drained {} job(s) from the delayed queue", self.count)
    }
}

impl StructuredLog for DelayedQueueDrained {
    fn log(&self) {
        if self.count > 0 {
            tracing::debug!(count = self.count, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("undelay", span_name = name, count = self.count)
    }
}
