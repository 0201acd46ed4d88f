// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wolfe: an in-process reliable job dispensing engine.
//!
//! Producers submit [`scheduler::todo::Todo`] graphs; the engine
//! linearizes them into [`scheduler::job::Job`]s, tracks named exclusion
//! locks and predecessor dependencies, and hands runnable jobs out to
//! [`execution::Executor`]s through the [`engine::Engine`] façade.

pub mod engine;
pub mod errors;
pub mod execution;
pub mod junk_yard;
pub mod observability;
pub mod scheduler;
