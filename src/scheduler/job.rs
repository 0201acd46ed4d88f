// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The engine's own record of a unit of work, grounded on
//! `wolfe/scheduler/_job.py`.
//!
//! Unlike a `Todo`, a `Job` is owned entirely by the engine: it has a
//! permanent id, validated predecessor ids, and an attempt history. Jobs
//! are produced only by `scheduler::graph::linearize`, never constructed
//! directly from user input.

use std::collections::BTreeSet;

use crate::errors::WolfeError;
use crate::execution::Attempt;
use crate::scheduler::lock::Lock;
use crate::scheduler::util::NotBefore;

/// A job's permanent identifier, monotonically assigned in submission
/// order. Ids start at 1; `0` never names a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub i64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The engine's record of one unit of work.
///
/// `locks_waiting` and `predecessors_waiting` are `None` until the job is
/// handed to the lock manager / waiting set respectively, mirroring the
/// Python source's use of `None` as "not yet entered" versus `0` as
/// "entered and already clear".
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub desc: String,
    pub group: String,
    pub locks: Vec<Lock>,
    pub locks_waiting: Option<usize>,
    pub importance: i64,
    pub not_before: NotBefore,
    pub extra: std::collections::HashMap<String, String>,
    pub predecessors: BTreeSet<i64>,
    pub predecessors_waiting: Option<usize>,
    pub attempts: Vec<Attempt>,
}

impl Job {
    /// Construct a job, validating each predecessor id against `depend_on`'s
    /// rule: it must be positive and strictly less than this job's own id
    /// (a job can only depend on work the linearizer placed before it).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: JobId,
        desc: impl Into<String>,
        group: impl Into<String>,
        locks: Vec<Lock>,
        importance: i64,
        not_before: NotBefore,
        extra: std::collections::HashMap<String, String>,
        predecessors: impl IntoIterator<Item = i64>,
    ) -> Result<Job, WolfeError> {
        let mut job = Job {
            id,
            desc: desc.into(),
            group: group.into(),
            locks,
            locks_waiting: None,
            importance,
            not_before,
            extra,
            predecessors: BTreeSet::new(),
            predecessors_waiting: None,
            attempts: Vec::new(),
        };
        for pred in predecessors {
            job.depend_on(pred)?;
        }
        Ok(job)
    }

    /// Add a validated predecessor id.
    pub fn depend_on(&mut self, job_id: i64) -> Result<(), WolfeError> {
        if job_id < 1 || job_id >= self.id.0 {
            return Err(WolfeError::InvalidPredecessor(job_id));
        }
        self.predecessors.insert(job_id);
        Ok(())
    }
}
