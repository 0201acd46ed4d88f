// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named exclusion locks, grounded on `wolfe/_lock.py`.
//!
//! Open Question 1 (`spec.md` section 9) asks whether non-exclusive locks
//! should be rejected at the todo interface, or whether the lock manager
//! should be extended to share them. This implementation rejects: a
//! non-exclusive `Lock` is a construction-time `LockConflict`, the same
//! error raised when two locks of the same name disagree on exclusivity.
//! This keeps the runtime's lock-manager assumption (`debug_assert!(lock.
//! exclusive)` in `scheduler::locks::Locks::enter`) truthful at the boundary
//! instead of merely hoped for internally.

use crate::errors::WolfeError;

/// A named exclusion token. At most one job may hold a given name at a
/// time (section 4.5); all locks in this implementation are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lock {
    pub name: String,
    pub exclusive: bool,
}

impl Lock {
    pub fn exclusive(name: impl Into<String>) -> Self {
        Self { name: name.into(), exclusive: true }
    }
}

/// Validate and normalize a todo's locks: sorted by name, duplicates of the
/// same name collapsed, any non-exclusive lock (or same-name exclusivity
/// disagreement) rejected as a `LockConflict`.
///
/// Mirrors `wolfe/_lock.py::validate` (sort-then-pop-dedup over a stack)
/// rather than building a `HashSet` first, so that the first conflicting
/// name encountered is the one reported — matching the Python source's
/// deterministic left-to-right conflict detection.
pub fn validate(locks: Vec<Lock>) -> Result<Vec<Lock>, WolfeError> {
    let mut sorted = locks;
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut result: Vec<Lock> = Vec::with_capacity(sorted.len());
    for lock in sorted {
        if !lock.exclusive {
            return Err(WolfeError::LockConflict(lock.name));
        }
        match result.last() {
            Some(last) if last.name == lock.name => {
                if last.exclusive != lock.exclusive {
                    return Err(WolfeError::LockConflict(lock.name));
                }
                // duplicate of an already-validated name: collapse
            }
            _ => result.push(lock),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_locks_validate_to_empty() {
        assert_eq!(validate(vec![]).unwrap(), vec![]);
    }

    #[test]
    fn duplicates_collapse() {
        let locks = vec![Lock::exclusive("x"), Lock::exclusive("x")];
        assert_eq!(validate(locks).unwrap(), vec![Lock::exclusive("x")]);
    }

    #[test]
    fn result_is_sorted_by_name() {
        let locks = vec![Lock::exclusive("b"), Lock::exclusive("a")];
        let result = validate(locks).unwrap();
        assert_eq!(result, vec![Lock::exclusive("a"), Lock::exclusive("b")]);
    }

    #[test]
    fn non_exclusive_lock_is_rejected() {
        let locks = vec![Lock { name: "x".into(), exclusive: false }];
        let err = validate(locks).unwrap_err();
        assert!(matches!(err, WolfeError::LockConflict(name) if name == "x"));
    }

    #[test]
    fn conflicting_exclusivity_on_same_name_is_rejected() {
        let locks = vec![Lock::exclusive("x"), Lock { name: "x".into(), exclusive: false }];
        let err = validate(locks).unwrap_err();
        assert!(matches!(err, WolfeError::LockConflict(name) if name == "x"));
    }
}
