// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The async-facing engine, grounded on the teacher's actor-style
//! single-owner pattern (`engine::reactive::ReactiveExecutor`): a
//! `Scheduler` lives behind one `tokio::sync::Mutex`, and every public
//! method here acquires it, runs the whole operation to completion, and
//! releases it without ever awaiting while held — satisfying `spec.md`
//! section 5's "no operation yields mid-way" rule.

use tokio::sync::Mutex;

use crate::errors::WolfeError;
use crate::execution::{Attempt, Executor, JobResult};
use crate::junk_yard::JunkYard;
use crate::scheduler::job::{Job, JobId};
use crate::scheduler::todo::Todo;
use crate::scheduler::util::{Clock, SystemClock};
use crate::scheduler::Scheduler;

/// The public entry point to the engine. Cheaply shareable across tasks
/// via `Arc<Engine>` — every method takes `&self`.
pub struct Engine {
    scheduler: Mutex<Scheduler>,
}

impl Engine {
    pub fn new(junk_yard: Box<dyn JunkYard>) -> Self {
        Self::with_clock(Box::new(SystemClock), junk_yard)
    }

    /// Build an engine against a custom clock, for deterministic tests of
    /// delayed-job behavior (scenario S3).
    pub fn with_clock(clock: Box<dyn Clock>, junk_yard: Box<dyn JunkYard>) -> Self {
        Self { scheduler: Mutex::new(Scheduler::new(clock, junk_yard)) }
    }

    pub async fn enter_todo(&self, todo: &Todo) -> Result<JobId, WolfeError> {
        self.scheduler.lock().await.enter_todo(todo)
    }

    pub async fn request_job(&self, executor: &Executor) -> Option<Job> {
        self.scheduler.lock().await.request_job(executor)
    }

    pub async fn finish_job(
        &self,
        executor_uid: &str,
        job_id: JobId,
        result: JobResult,
    ) -> Result<(), WolfeError> {
        self.scheduler.lock().await.finish_job(job_id.0, executor_uid, result)
    }

    pub async fn execution_attempt(&self, job_id: JobId) -> Option<Attempt> {
        self.scheduler.lock().await.execution_attempt(job_id.0).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::junk_yard::InMemoryJunkYard;
    use crate::scheduler::todo::Dependency;
    use crate::scheduler::util::NotBefore;

    #[tokio::test]
    async fn a_single_todo_can_be_entered_dispatched_and_finished() {
        let engine = Engine::new(Box::new(InMemoryJunkYard::new()));
        let todo = Todo::new("build", vec![], vec![], None, None, NotBefore::Now).unwrap();
        let root_id = engine.enter_todo(&todo).await.unwrap();

        let executor = Executor::new("worker-1", None);
        let job = engine.request_job(&executor).await.unwrap();
        assert_eq!(job.id, root_id);

        engine.finish_job("worker-1", root_id, JobResult::success("done")).await.unwrap();
        assert!(engine.request_job(&executor).await.is_none());
    }

    #[tokio::test]
    async fn re_requesting_with_the_same_executor_returns_the_same_job() {
        let engine = Engine::new(Box::new(InMemoryJunkYard::new()));
        let todo = Todo::new("build", vec![], vec![], None, None, NotBefore::Now).unwrap();
        engine.enter_todo(&todo).await.unwrap();

        let executor = Executor::new("worker-1", None);
        let first = engine.request_job(&executor).await.unwrap();
        let second = engine.request_job(&executor).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn finishing_with_the_wrong_executor_is_rejected() {
        let engine = Engine::new(Box::new(InMemoryJunkYard::new()));
        let todo = Todo::new("build", vec![], vec![], None, None, NotBefore::Now).unwrap();
        let root_id = engine.enter_todo(&todo).await.unwrap();
        let executor = Executor::new("worker-1", None);
        engine.request_job(&executor).await.unwrap();

        let err = engine.finish_job("worker-2", root_id, JobResult::success("done")).await.unwrap_err();
        assert!(matches!(err, WolfeError::InvalidExecutor { .. }));
    }

    #[tokio::test]
    async fn finishing_an_unassigned_job_is_rejected() {
        let engine = Engine::new(Box::new(InMemoryJunkYard::new()));
        let err = engine
            .finish_job("worker-1", JobId(1), JobResult::success("done"))
            .await
            .unwrap_err();
        assert!(matches!(err, WolfeError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn dependent_job_becomes_available_once_predecessor_finishes() {
        let engine = Engine::new(Box::new(InMemoryJunkYard::new()));
        let a = Todo::new("a", vec![], vec![], None, None, NotBefore::Now).unwrap();
        let b = Todo::new("b", vec![Dependency::Todo(a.clone())], vec![], None, None, NotBefore::Now).unwrap();
        engine.enter_todo(&a).await.unwrap();

        let executor = Executor::new("worker-1", None);
        let first = engine.request_job(&executor).await.unwrap();
        assert!(engine.request_job(&Executor::new("worker-2", None)).await.is_none());

        engine.finish_job("worker-1", first.id, JobResult::success("done")).await.unwrap();
        let second = engine.request_job(&Executor::new("worker-2", None)).await.unwrap();
        assert_ne!(second.id, first.id);
        let _ = b;
    }
}
