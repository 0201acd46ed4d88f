// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The sink for successfully finished jobs, grounded on `wolfe/_main.py`'s
//! `finished` constructor argument (backed by `wolfe/_junk_yard.py`, not
//! present in the retrieved reference material — its contract is inferred
//! from the single call site, `Scheduler.finish_job`'s `self._finished.put(job)`).
//!
//! The engine treats this as an opaque sink: once a job succeeds, it is
//! handed off and the engine keeps no further record of it (`spec.md`
//! section 4.8). Production deployments plug in whatever durable store
//! they want; this crate ships an in-memory reference implementation for
//! tests and the demo CLI.

use std::sync::{Arc, Mutex};

use crate::scheduler::job::Job;

/// Receives jobs once they finish successfully. Implementations should not
/// block for long — `Scheduler::finish_job` calls this synchronously,
/// inside the engine's single exclusion domain (`SPEC_FULL.md` section 5).
pub trait JunkYard: Send + Sync {
    fn put(&self, job: Job);
}

/// An in-memory `JunkYard` that just accumulates finished jobs, shareable
/// across the engine boundary via `Arc<Mutex<_>>` so callers can inspect
/// results after the fact.
#[derive(Clone, Default)]
pub struct InMemoryJunkYard {
    jobs: Arc<Mutex<Vec<Job>>>,
}

impl InMemoryJunkYard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything finished so far, oldest first.
    pub fn finished(&self) -> Vec<Job> {
        self.jobs.lock().expect("junk yard mutex poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().expect("junk yard mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JunkYard for InMemoryJunkYard {
    fn put(&self, job: Job) {
        self.jobs.lock().expect("junk yard mutex poisoned").push(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::job::JobId;
    use crate::scheduler::util::NotBefore;

    #[test]
    fn put_jobs_accumulate_in_order() {
        let yard = InMemoryJunkYard::new();
        for id in 1..=3 {
            let job =
                Job::new(JobId(id), "j", "default", vec![], 0, NotBefore::Now, Default::default(), vec![])
                    .unwrap();
            yard.put(job);
        }
        let finished = yard.finished();
        assert_eq!(finished.len(), 3);
        assert_eq!(finished[0].id, JobId(1));
        assert_eq!(finished[2].id, JobId(3));
    }
}
