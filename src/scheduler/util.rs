// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scheduler-internal utilities: the clock abstraction, default constants,
//! and `not_before` resolution.
//!
//! Grounded on `wolfe/scheduler/_util.py::scheduled_time` in the original
//! implementation: `not_before` is resolved to an absolute epoch-second
//! value at the moment a job is entered, never re-resolved later.

use chrono::{DateTime, Utc};

/// Default job group, applied when a todo omits one.
pub const DEFAULT_GROUP: &str = "default";

/// Default job importance, applied when a todo omits one.
pub const DEFAULT_IMPORTANCE: i64 = 0;

/// A source of wall-clock time, abstracted so tests can advance it
/// deterministically (scenario S3 in `spec.md` section 8 requires exactly
/// this: submit a delayed job, advance the clock, observe it become
/// dispatchable).
pub trait Clock: Send + Sync {
    /// Current time, in whole seconds since the Unix epoch.
    fn now(&self) -> i64;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// A `not_before` constraint as supplied on a `Todo`.
///
/// Mirrors the three forms accepted by the Python source's `not_before`
/// parameter: no delay, a relative number of seconds, or an absolute point
/// in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotBefore {
    /// Execute as soon as possible.
    Now,
    /// Delay by this many seconds from the moment the todo is entered.
    In(i64),
    /// Execute no earlier than this absolute UTC instant.
    At(DateTime<Utc>),
}

impl Default for NotBefore {
    fn default() -> Self {
        NotBefore::Now
    }
}

/// Resolve a `NotBefore` to an absolute epoch-second scheduled time.
///
/// Relative delays are measured from `now`. Negative deltas (an absolute
/// time already in the past) clamp to `now`, matching the Python source's
/// `max(0, int((not_before - now).total_seconds()))`.
pub fn scheduled_time(not_before: &NotBefore, now: i64) -> i64 {
    match not_before {
        NotBefore::Now => now,
        NotBefore::In(secs) => now + (*secs).max(0),
        NotBefore::At(at) => {
            let delta = at.timestamp() - now;
            now + delta.max(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn now_resolves_to_current_time() {
        assert_eq!(scheduled_time(&NotBefore::Now, 1_000), 1_000);
    }

    #[test]
    fn relative_delay_adds_seconds() {
        assert_eq!(scheduled_time(&NotBefore::In(5), 1_000), 1_005);
    }

    #[test]
    fn negative_relative_delay_clamps_to_now() {
        assert_eq!(scheduled_time(&NotBefore::In(-5), 1_000), 1_000);
    }

    #[test]
    fn past_absolute_time_clamps_to_now() {
        let past = DateTime::<Utc>::from_timestamp(500, 0).unwrap();
        assert_eq!(scheduled_time(&NotBefore::At(past), 1_000), 1_000);
    }

    #[test]
    fn future_absolute_time_resolves_exactly() {
        let now = Utc::now();
        let future = now + Duration::seconds(30);
        assert_eq!(scheduled_time(&NotBefore::At(future), now.timestamp()), now.timestamp() + 30);
    }
}
