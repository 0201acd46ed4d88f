// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Producer-side todo graph, grounded on `wolfe/_todo.py`.
//!
//! A `Todo` is ephemeral: the engine only retains the derived `Job` once
//! linearized (`scheduler::graph::joblist_from_todo`). Todos reference each
//! other through `on_success` edges, forming the DAG the linearizer walks;
//! identity (not equality of contents) is what the linearizer dedupes on,
//! mirroring the Python source's `id(todo)` keyed virtual-node map.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::WolfeError;
use crate::scheduler::lock::{self, Lock};
use crate::scheduler::util::{NotBefore, DEFAULT_GROUP, DEFAULT_IMPORTANCE};

/// Monotonic construction order, used by `scheduler::graph::linearize` to
/// break topological-sort ties the same way the Python source's natural
/// object-creation order does: among several todos that become schedulable
/// at once, the one built first gets the lower job id.
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

struct TodoInner {
    desc: String,
    group: String,
    importance: i64,
    locks: Vec<Lock>,
    not_before: NotBefore,
    predecessors: Vec<i64>,
    successors: Vec<Todo>,
}

/// A node in a producer-side dependency graph.
///
/// Cheaply clonable: clones share the same underlying node, so mutating one
/// handle (via `on_success`) is visible through every other clone — this is
/// what lets a dependency list mix "depend on this existing Todo" entries
/// with "depend on this already-submitted job id" entries.
#[derive(Clone)]
pub struct Todo {
    inner: Rc<RefCell<TodoInner>>,
    seq: u64,
}

/// An entry in a todo's `depends_on` list: either another todo in the same
/// graph, or the id of a job already accepted by the engine.
pub enum Dependency {
    Job(i64),
    Todo(Todo),
}

impl Todo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        desc: impl Into<String>,
        depends_on: Vec<Dependency>,
        locks: Vec<Lock>,
        importance: Option<i64>,
        group: Option<String>,
        not_before: NotBefore,
    ) -> Result<Todo, WolfeError> {
        let locks = lock::validate(locks)?;
        let todo = Todo {
            inner: Rc::new(RefCell::new(TodoInner {
                desc: desc.into(),
                group: group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
                importance: importance.unwrap_or(DEFAULT_IMPORTANCE),
                locks,
                not_before,
                predecessors: Vec::new(),
                successors: Vec::new(),
            })),
            seq: NEXT_SEQ.fetch_add(1, Ordering::Relaxed),
        };

        for dep in depends_on {
            match dep {
                Dependency::Job(id) => todo.inner.borrow_mut().predecessors.push(id),
                Dependency::Todo(parent) => {
                    parent.on_success(todo.clone());
                }
            }
        }

        Ok(todo)
    }

    /// Chain `child` to run after `self` succeeds. Returns `child` for
    /// easier chaining, matching `wolfe/_todo.py::Todo.on_success`.
    pub fn on_success(&self, child: Todo) -> Todo {
        self.inner.borrow_mut().successors.push(child.clone());
        child
    }

    /// External job ids this todo depends on.
    pub fn predecessors(&self) -> Vec<i64> {
        self.inner.borrow().predecessors.clone()
    }

    /// Other todos chained to run after this one succeeds.
    pub fn successors(&self) -> Vec<Todo> {
        self.inner.borrow().successors.clone()
    }

    pub fn desc(&self) -> String {
        self.inner.borrow().desc.clone()
    }

    pub fn group(&self) -> String {
        self.inner.borrow().group.clone()
    }

    pub fn importance(&self) -> i64 {
        self.inner.borrow().importance
    }

    pub fn locks(&self) -> Vec<Lock> {
        self.inner.borrow().locks.clone()
    }

    pub fn not_before(&self) -> NotBefore {
        self.inner.borrow().not_before.clone()
    }

    /// A stable identity for this node, used by the linearizer to dedupe
    /// revisits of the same todo — the Rust equivalent of `id(todo)`.
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    /// This todo's construction order relative to every other todo in the
    /// process, used by the linearizer to break topological-sort ties.
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    /// A lightweight, ownership-free snapshot for error payloads.
    pub fn handle(&self) -> TodoHandle {
        TodoHandle { desc: self.desc() }
    }
}

impl PartialEq for Todo {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for Todo {}

impl Hash for Todo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// A named, reusable template for constructing todos with shared defaults.
///
/// Mirrors `wolfe/_todo.py::TodoDescription`.
#[derive(Debug, Clone)]
pub struct TodoDescription {
    pub name: String,
    pub locks: Option<Vec<Lock>>,
    pub importance: Option<i64>,
    pub group: Option<String>,
}

impl TodoDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), locks: None, importance: None, group: None }
    }

    pub fn with_locks(mut self, locks: Vec<Lock>) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn with_importance(mut self, importance: i64) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Construct a todo from this description, falling back to the
    /// description's defaults for any field left unspecified.
    #[allow(clippy::too_many_arguments)]
    pub fn todo(
        &self,
        depends_on: Vec<Dependency>,
        locks: Option<Vec<Lock>>,
        importance: Option<i64>,
        group: Option<String>,
        not_before: NotBefore,
    ) -> Result<Todo, WolfeError> {
        Todo::new(
            self.name.clone(),
            depends_on,
            locks.or_else(|| self.locks.clone()).unwrap_or_default(),
            importance.or(self.importance),
            group.or_else(|| self.group.clone()),
            not_before,
        )
    }
}

/// An ownership-free identifier for a `Todo`, suitable for carrying in
/// error payloads (e.g. `WolfeError::DependencyCycle`) without keeping the
/// whole graph alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoHandle {
    pub desc: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_with_no_dependencies_has_empty_edges() {
        let t = Todo::new("root", vec![], vec![], None, None, NotBefore::Now).unwrap();
        assert!(t.predecessors().is_empty());
        assert!(t.successors().is_empty());
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let t = Todo::new("root", vec![], vec![], None, None, NotBefore::Now).unwrap();
        assert_eq!(t.group(), DEFAULT_GROUP);
        assert_eq!(t.importance(), DEFAULT_IMPORTANCE);
    }

    #[test]
    fn depending_on_a_todo_registers_as_its_successor() {
        let parent = Todo::new("parent", vec![], vec![], None, None, NotBefore::Now).unwrap();
        let child = Todo::new(
            "child",
            vec![Dependency::Todo(parent.clone())],
            vec![],
            None,
            None,
            NotBefore::Now,
        )
        .unwrap();
        let successors = parent.successors();
        assert_eq!(successors.len(), 1);
        assert_eq!(successors[0], child);
    }

    #[test]
    fn depending_on_a_job_id_registers_as_external_predecessor() {
        let t = Todo::new("root", vec![Dependency::Job(3)], vec![], None, None, NotBefore::Now).unwrap();
        assert_eq!(t.predecessors(), vec![3]);
    }

    #[test]
    fn conflicting_locks_reject_construction() {
        let err = Todo::new(
            "root",
            vec![],
            vec![Lock::exclusive("x"), Lock { name: "x".into(), exclusive: false }],
            None,
            None,
            NotBefore::Now,
        )
        .unwrap_err();
        assert!(matches!(err, WolfeError::LockConflict(name) if name == "x"));
    }

    #[test]
    fn description_applies_defaults_to_constructed_todos() {
        let desc = TodoDescription::new("build").with_group("ci").with_importance(5);
        let t = desc.todo(vec![], None, None, None, NotBefore::Now).unwrap();
        assert_eq!(t.group(), "ci");
        assert_eq!(t.importance(), 5);
    }
}
