// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Executor-facing types: `Executor`, `Attempt`, and `JobResult`.
//!
//! Grounded on `wolfe/_execution.py` in the original implementation: an
//! executor is a thin identity (`uid` + declared `groups`) that mints
//! `Attempt`s when handed a job and `JobResult`s when reporting completion.
//! Process management (spawning, capturing stdout/stderr, timeouts) is the
//! executor's own responsibility and out of scope here (`spec.md` section 1).

/// An external worker that polls the engine for runnable jobs.
///
/// `groups` declares which group queues this executor is willing to pull
/// from; `None` (or an empty list) means the default group only.
#[derive(Debug, Clone)]
pub struct Executor {
    pub uid: String,
    pub groups: Option<Vec<String>>,
}

impl Executor {
    pub fn new(uid: impl Into<String>, groups: Option<Vec<String>>) -> Self {
        let groups = match groups {
            Some(g) if !g.is_empty() => Some(g),
            _ => None,
        };
        Self { uid: uid.into(), groups }
    }

    /// Construct a fresh execution attempt, capturing the start time.
    pub fn attempt(&self, now: i64) -> Attempt {
        Attempt {
            executor_uid: self.uid.clone(),
            start_time: now,
            end_time: None,
            result: None,
        }
    }

    /// Build an execution result for `finish_job`.
    pub fn result(&self, exit_code: i32, stdout: String, stderr: String) -> JobResult {
        JobResult { exit_code, failed: exit_code != 0, stdout, stderr }
    }
}

/// One assignment of a job to an executor.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub executor_uid: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub result: Option<JobResult>,
}

impl Attempt {
    pub(crate) fn finish(&mut self, end_time: i64, result: JobResult) {
        self.end_time = Some(end_time);
        self.result = Some(result);
    }
}

/// The outcome of one execution attempt.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub exit_code: i32,
    pub failed: bool,
    pub stdout: String,
    pub stderr: String,
}

impl JobResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self { exit_code: 0, failed: false, stdout: stdout.into(), stderr: String::new() }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        debug_assert_ne!(exit_code, 0, "a failing result must carry a non-zero exit code");
        Self { exit_code, failed: true, stdout: String::new(), stderr: stderr.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_captures_start_time() {
        let executor = Executor::new("worker-1", None);
        let attempt = executor.attempt(1000);
        assert_eq!(attempt.executor_uid, "worker-1");
        assert_eq!(attempt.start_time, 1000);
        assert!(attempt.end_time.is_none());
    }

    #[test]
    fn result_failed_flag_matches_exit_code() {
        let executor = Executor::new("worker-1", None);
        assert!(!executor.result(0, String::new(), String::new()).failed);
        assert!(executor.result(1, String::new(), String::new()).failed);
    }

    #[test]
    fn empty_groups_normalizes_to_default() {
        let executor = Executor::new("worker-1", Some(vec![]));
        assert!(executor.groups.is_none());
    }
}
