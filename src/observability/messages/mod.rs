// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging and distributed tracing.
//!
//! This module contains all message types used throughout Wolfe for
//! diagnostic and operational logging. Each message type implements:
//!
//! * `Display` - Human-readable output (supports future i18n)
//! * `StructuredLog` - Machine-readable fields + OpenTelemetry span creation
//!
//! # Organization
//!
//! * `scheduler` - todo entry, delay/wait/lock transitions, dispatch and
//!   completion events
//!
//! # Usage Patterns
//!
//! ## Basic Logging (Human-Readable)
//! ```rust
//! use wolfe::observability::messages::scheduler::JobDispatched;
//!
//! let msg = JobDispatched { job_id: 7, group: "default", executor_uid: "worker-1" };
//!
//! tracing::info!("{}", msg);
//! ```
//!
//! ## Structured Logging (Machine-Readable)
//! ```rust
//! use wolfe::observability::messages::{StructuredLog, scheduler::JobDispatched};
//!
//! let msg = JobDispatched { job_id: 7, group: "default", executor_uid: "worker-1" };
//!
//! // Emits both human-readable message AND structured fields
//! msg.log();
//! ```
//!
//! ## Distributed Tracing (OpenTelemetry)
//! ```rust
//! use wolfe::observability::messages::{StructuredLog, scheduler::JobDispatched};
//!
//! let msg = JobDispatched { job_id: 7, group: "default", executor_uid: "worker-1" };
//!
//! let span = msg.span("dispatch");
//! let _guard = span.enter();
//! // ... work happens here with span context ...
//! ```

pub mod scheduler;

use tracing::Span;

/// Trait for messages that support structured logging and distributed tracing.
///
/// This trait provides two key capabilities:
///
/// 1. **Structured Logging** - Emit log events with machine-readable fields
///    for querying, metrics extraction, and alerting
/// 2. **Distributed Tracing** - Create OpenTelemetry spans with attributes
///    for end-to-end request tracing and performance analysis
///
/// # Example: Structured Logging
/// ```rust
/// use wolfe::observability::messages::{StructuredLog, scheduler::JobDispatched};
///
/// let msg = JobDispatched { job_id: 7, group: "default", executor_uid: "worker-1" };
///
/// // Emits: INFO message + fields {job_id, group, executor_uid}
/// msg.log();
/// ```
pub trait StructuredLog {
    /// Emit a log event with structured fields.
    ///
    /// This logs both the human-readable message (via `Display`) and
    /// machine-readable fields for querying and metrics. The log level is
    /// determined by the message type's semantic meaning.
    fn log(&self);

    /// Create an OpenTelemetry span with this message's fields as attributes.
    ///
    /// The span is automatically closed when the returned guard is dropped.
    fn span(&self, name: &str) -> Span;
}
