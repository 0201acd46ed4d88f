// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The scheduler core: todo linearization, the job lifecycle state
//! machine, lock management, per-group priority queues, and dispatch.
//!
//! This module tree has no async in it at all — it's the synchronous
//! engine grounded on `wolfe/scheduler/` in the original implementation.
//! `crate::engine::Engine` wraps a `Scheduler` behind a `tokio::sync::Mutex`
//! to give it the concurrency story described in `SPEC_FULL.md` section 5.

pub mod delayed;
pub mod graph;
pub mod group;
pub mod job;
pub mod job_queue;
pub mod lock;
pub mod locks;
pub mod scheduler;
pub mod todo;
pub mod util;
pub mod waiting;

pub use scheduler::Scheduler;
