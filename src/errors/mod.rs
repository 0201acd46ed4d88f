// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the scheduler, propagated synchronously from the
//! originating call. No error is retried internally.

use crate::scheduler::job::JobId;
use crate::scheduler::todo::TodoHandle;

/// Errors raised by the public engine API.
#[derive(Debug, thiserror::Error)]
pub enum WolfeError {
    /// A single todo's locks contradict themselves on exclusivity, or
    /// declare a non-exclusive lock (Open Question 1, resolved: rejected).
    #[error("lock conflict on {0:?}")]
    LockConflict(String),

    /// `enter_todo` found a cycle in the todo graph. No jobs were created.
    #[error("dependency cycle among {} todo(s)", .0.len())]
    DependencyCycle(Vec<TodoHandle>),

    /// `depend_on` was given a non-positive id, or one not strictly less
    /// than the referencing job's own id.
    #[error("invalid predecessor id {0}")]
    InvalidPredecessor(i64),

    /// `finish_job` was called with a job id that has no outstanding
    /// assignment.
    #[error("job {0:?} not found")]
    JobNotFound(JobId),

    /// `finish_job` was called with an executor uid that does not own the
    /// assignment for this job.
    #[error("executor {executor_uid:?} does not own job {job_id:?}")]
    InvalidExecutor { job_id: JobId, executor_uid: String },
}
