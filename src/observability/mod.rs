// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging, tracing, and metrics.
//!
//! This module provides centralized message types for all diagnostic and
//! operational logging emitted by the scheduler. Message types follow a
//! struct-based pattern with a `Display` impl to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Enable future internationalization without code changes
//! * Maintain Single Responsibility Principle (SRP)
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! * `messages::scheduler` - todo entry, delay/wait/lock transitions,
//!   dispatch and completion events
//!
//! # Usage
//!
//! ```rust
//! use wolfe::observability::messages::scheduler::JobFailed;
//!
//! let msg = JobFailed { job_id: 7, exit_code: 1 };
//!
//! tracing::error!("{}", msg);
//! ```

pub mod messages;
