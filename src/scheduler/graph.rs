// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Linearizing a todo graph into an ordered list of jobs, grounded on
//! `wolfe/scheduler/_job.py::joblist_from_todo` for the traversal and on
//! the teacher's `src/config/dependency_graph.rs` for the Kahn's-algorithm
//! topological sort with cycle detection (`_graph.py` itself was not part
//! of the retrieved reference material, so the resolution strategy here is
//! a fresh implementation of the same topological contract rather than a
//! port).
//!
//! A todo graph is walked depth-first from its root, assigning each
//! distinct todo a virtual node id the first time it's discovered (todos
//! reachable through more than one path are only ever visited once, keyed
//! by `Todo::identity`). External predecessor ids referenced via
//! `Todo::predecessors` become graph nodes too, so the same topological
//! sort that orders todos relative to each other also guarantees every
//! todo comes after the already-submitted jobs it depends on.
//!
//! Kahn's algorithm alone only guarantees *a* valid topological order —
//! when more than one node is simultaneously schedulable it says nothing
//! about which comes first. To make job id assignment deterministic (and
//! to match the Python source's behavior of numbering todos in the order
//! they were constructed), ties are broken by `Todo::seq`: whenever several
//! nodes have no unresolved dependency, the one built earliest goes next,
//! not simply the one that happened to become ready first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::errors::WolfeError;
use crate::scheduler::job::{Job, JobId};
use crate::scheduler::todo::Todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Node {
    /// A job id already known to the engine (a predecessor outside this
    /// graph). Carries no ordering constraints of its own — it just needs
    /// to appear before whichever virtual nodes depend on it.
    External(i64),
    /// A todo discovered while walking this graph, identified by
    /// discovery order.
    Virtual(usize),
}

#[derive(Default)]
struct DependencyGraph {
    nodes: Vec<Node>,
    seen: HashSet<Node>,
    edges: HashMap<Node, Vec<Node>>,
}

impl DependencyGraph {
    fn ensure(&mut self, node: Node) {
        if self.seen.insert(node) {
            self.nodes.push(node);
        }
    }

    /// Record that `from` must be resolved before `to`.
    fn add(&mut self, from: Node, to: Node) {
        self.ensure(from);
        self.ensure(to);
        self.edges.entry(from).or_default().push(to);
    }

    /// Kahn's algorithm: repeatedly peel off a node with no unresolved
    /// dependency. Among several simultaneously-ready nodes, `priority`
    /// picks the one that goes next — lower sorts first — so independent
    /// todos come out in the order the caller declared them rather than
    /// whatever order they happened to become ready in. Any nodes left
    /// over once the frontier dries up are the cycle.
    fn resolve(&self, priority: impl Fn(Node) -> i64) -> Result<Vec<Node>, Vec<Node>> {
        let mut indegree: HashMap<Node, usize> = self.nodes.iter().map(|n| (*n, 0)).collect();
        for tos in self.edges.values() {
            for to in tos {
                *indegree.get_mut(to).expect("edge target must be a known node") += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<(i64, Node)>> = self
            .nodes
            .iter()
            .copied()
            .filter(|n| indegree[n] == 0)
            .map(|n| Reverse((priority(n), n)))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(Reverse((_, node))) = ready.pop() {
            order.push(node);
            if let Some(tos) = self.edges.get(&node) {
                for to in tos {
                    let d = indegree.get_mut(to).unwrap();
                    *d -= 1;
                    if *d == 0 {
                        ready.push(Reverse((priority(*to), *to)));
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            let resolved: HashSet<Node> = order.into_iter().collect();
            Err(self.nodes.iter().copied().filter(|n| !resolved.contains(n)).collect())
        }
    }
}

/// Linearize a todo graph rooted at `root` into jobs, assigning each job
/// the next id from `next_id` (shared across the engine's whole lifetime,
/// so ids never repeat across separate calls). Returns the jobs in
/// dependency order: every job appears after all of its predecessors.
///
/// On a cycle, no ids are consumed and no jobs are produced — `next_id` is
/// left untouched, matching the all-or-nothing semantics of
/// `wolfe/scheduler/_scheduler.py::enter_todo`.
pub fn linearize(root: &Todo, next_id: &mut i64) -> Result<Vec<Job>, WolfeError> {
    let mut graph = DependencyGraph::default();
    let mut discovered: HashMap<usize, Todo> = HashMap::new();
    let mut virtual_id_of: HashMap<usize, usize> = HashMap::new();
    // Each virtual node's direct dependencies, in the order discovered —
    // the Rust equivalent of the Python source's per-todo `pre` list, used
    // below to translate into `Job::depend_on` calls once real ids exist.
    let mut parents_of: HashMap<usize, Vec<Node>> = HashMap::new();

    let mut stack: VecDeque<(Todo, Option<usize>)> = VecDeque::new();
    stack.push_back((root.clone(), None));

    while let Some((todo, parent_vid)) = stack.pop_back() {
        let identity = todo.identity();
        let virtual_id = if let Some(&vid) = virtual_id_of.get(&identity) {
            vid
        } else {
            let vid = discovered.len();
            virtual_id_of.insert(identity, vid);
            discovered.insert(vid, todo.clone());
            parents_of.insert(vid, Vec::new());

            for pred in todo.predecessors() {
                graph.add(Node::External(pred), Node::Virtual(vid));
                parents_of.get_mut(&vid).unwrap().push(Node::External(pred));
            }
            let successors = todo.successors();
            for (i, succ) in successors.into_iter().enumerate() {
                // insert so the first-declared successor is the next one
                // popped, matching a standard DFS traversal order.
                let pos = stack.len() - i.min(stack.len());
                stack.insert(pos, (succ, Some(vid)));
            }
            vid
        };

        if let Some(parent_vid) = parent_vid {
            graph.add(Node::Virtual(parent_vid), Node::Virtual(virtual_id));
            parents_of.get_mut(&virtual_id).unwrap().push(Node::Virtual(parent_vid));
        } else {
            graph.ensure(Node::Virtual(virtual_id));
        }
    }

    let priority = |node: Node| match node {
        Node::Virtual(vid) => discovered[&vid].seq() as i64,
        Node::External(_) => i64::MIN,
    };

    let order = graph.resolve(priority).map_err(|stuck| {
        let mut handles: Vec<_> = stuck
            .into_iter()
            .filter_map(|n| match n {
                Node::Virtual(vid) => discovered.get(&vid).map(Todo::handle),
                Node::External(_) => None,
            })
            .collect();
        handles.dedup();
        WolfeError::DependencyCycle(handles)
    })?;

    let mut jobs = Vec::new();
    let mut id_mapping: HashMap<usize, i64> = HashMap::new();

    for node in order {
        let Node::Virtual(vid) = node else { continue };
        let todo = &discovered[&vid];

        let id = *next_id;
        *next_id += 1;
        let job_id = JobId(id);

        let mut job = Job::new(
            job_id,
            todo.desc(),
            todo.group(),
            todo.locks(),
            todo.importance(),
            todo.not_before(),
            Default::default(),
            Vec::new(),
        )?;

        // Parents were discovered before this node (resolve() guarantees
        // it), so every virtual parent already has a real id assigned.
        for parent in &parents_of[&vid] {
            let real_id = match parent {
                Node::External(id) => *id,
                Node::Virtual(parent_vid) => id_mapping[parent_vid],
            };
            job.depend_on(real_id)?;
        }

        id_mapping.insert(vid, id);
        jobs.push(job);
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::todo::Dependency;
    use crate::scheduler::util::NotBefore;

    fn todo(desc: &str, depends_on: Vec<Dependency>) -> Todo {
        Todo::new(desc, depends_on, vec![], None, None, NotBefore::Now).unwrap()
    }

    #[test]
    fn single_todo_gets_one_job() {
        let mut next_id = 1;
        let jobs = linearize(&todo("root", vec![]), &mut next_id).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, JobId(1));
        assert_eq!(next_id, 2);
    }

    #[test]
    fn chain_orders_predecessor_before_dependent() {
        let a = todo("a", vec![]);
        let b = a.on_success(todo("b", vec![]));
        let mut next_id = 1;
        let jobs = linearize(&a, &mut next_id).unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.desc.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(jobs[1].predecessors.contains(&jobs[0].id.0));
        let _ = b;
    }

    #[test]
    fn fan_out_then_join_orders_root_first_and_join_last() {
        let a = todo("a", vec![]);
        let b = a.on_success(todo("b", vec![]));
        let c = a.on_success(todo("c", vec![]));
        let d = a.on_success(todo("d", vec![]));
        let _e = todo(
            "e",
            vec![Dependency::Todo(b.clone()), Dependency::Todo(c.clone()), Dependency::Todo(d.clone())],
        );

        let mut next_id = 1;
        let jobs = linearize(&a, &mut next_id).unwrap();
        let descs: Vec<_> = jobs.iter().map(|j| j.desc.clone()).collect();
        assert_eq!(descs.first(), Some(&"a".to_string()));
        assert_eq!(descs.last(), Some(&"e".to_string()));
        assert_eq!(jobs.len(), 5);
    }

    #[test]
    fn external_predecessor_becomes_job_predecessor() {
        let t = todo("b", vec![Dependency::Job(1)]);
        let mut next_id = 2;
        let jobs = linearize(&t, &mut next_id).unwrap();
        assert_eq!(jobs[0].predecessors.iter().collect::<Vec<_>>(), vec![&1]);
    }

    #[test]
    fn uneven_branch_depths_still_order_by_construction_sequence() {
        // a -> b -> e (b's only child) and a -> c -> d (c's only child): a
        // "first ready, first out" queue would emit e (b's child, ready as
        // soon as b finishes) before d (c's child, not ready until c
        // finishes — and c was processed after b), giving a, b, c, e, d.
        // d was declared before e, so the expected order keeps d ahead.
        let a = todo("a", vec![]);
        let b = a.on_success(todo("b", vec![]));
        let c = a.on_success(todo("c", vec![]));
        let _d = c.on_success(todo("d", vec![]));
        let _e = b.on_success(todo("e", vec![]));

        let mut next_id = 1;
        let jobs = linearize(&a, &mut next_id).unwrap();
        let descs: Vec<_> = jobs.iter().map(|j| j.desc.clone()).collect();
        assert_eq!(descs, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn cycle_is_rejected_without_consuming_ids() {
        let a = todo("a", vec![]);
        let b = a.on_success(todo("b", vec![]));
        // close the cycle: b depends on a, and a (via on_success) already
        // implies a precedes b, so make a also depend on b directly.
        a.on_success(b.clone());
        let c_cycle = Todo::new("c", vec![Dependency::Todo(b.clone())], vec![], None, None, NotBefore::Now).unwrap();
        b.on_success(c_cycle.clone());
        c_cycle.on_success(a.clone());

        let mut next_id = 1;
        let err = linearize(&a, &mut next_id).unwrap_err();
        assert!(matches!(err, WolfeError::DependencyCycle(_)));
        assert_eq!(next_id, 1);
    }
}
