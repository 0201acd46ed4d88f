// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A small interactive demo binary: loads a todo graph described as YAML,
//! submits it to a fresh `Engine`, and pits a configurable number of
//! synthetic executors against it until the graph drains (or a few seconds
//! pass, whichever comes first).
//!
//! This is ambient tooling, not the scheduler core — ids, groups, and locks
//! all flow through the same public `wolfe` API a real executor process
//! would use.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use wolfe::engine::Engine;
use wolfe::execution::{Executor, JobResult};
use wolfe::junk_yard::InMemoryJunkYard;
use wolfe::scheduler::lock::Lock;
use wolfe::scheduler::todo::{Dependency, Todo};
use wolfe::scheduler::util::NotBefore;

#[derive(Debug, Deserialize)]
struct TodoSpec {
    name: String,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    importance: Option<i64>,
    #[serde(default)]
    locks: Vec<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    not_before_secs: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GraphSpec {
    todos: Vec<TodoSpec>,
}

/// Build every todo in declaration order, resolving `depends_on` names
/// against todos already declared earlier in the file. A todo with no
/// local dependencies is a root of its own connected component and gets
/// entered into the engine separately.
fn build_graph(spec: GraphSpec) -> anyhow::Result<Vec<Todo>> {
    let mut todos: HashMap<String, Todo> = HashMap::new();
    let mut roots = Vec::new();

    for t in &spec.todos {
        let depends_on = t
            .depends_on
            .iter()
            .map(|name| {
                todos.get(name).cloned().map(Dependency::Todo).with_context(|| {
                    format!("todo {:?} depends on {:?}, which isn't declared earlier in the file", t.name, name)
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let locks = t.locks.iter().cloned().map(Lock::exclusive).collect();
        let not_before = match t.not_before_secs {
            Some(secs) => NotBefore::In(secs),
            None => NotBefore::Now,
        };

        let todo = Todo::new(t.name.clone(), depends_on, locks, t.importance, t.group.clone(), not_before)
            .with_context(|| format!("building todo {:?}", t.name))?;

        if t.depends_on.is_empty() {
            roots.push(todo.clone());
        }
        todos.insert(t.name.clone(), todo);
    }

    Ok(roots)
}

async fn run_executor(engine: Arc<Engine>, executor: Executor) {
    loop {
        match engine.request_job(&executor).await {
            Some(job) => {
                println!("  [{}] running {:?} (job {})", executor.uid, job.desc, job.id);
                tokio::time::sleep(Duration::from_millis(200)).await;
                let result = JobResult::success(format!("{} done", job.desc));
                if let Err(err) = engine.finish_job(&executor.uid, job.id, result).await {
                    eprintln!("  [{}] couldn't report completion of job {}: {}", executor.uid, job.id, err);
                }
            }
            None => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <graph.yaml> [executor_count] [group1,group2,...]", args[0]);
        eprintln!("Example: {} demos/diamond.yaml 3 io,analysis", args[0]);
        std::process::exit(1);
    }

    let graph_file = &args[1];
    let executor_count: usize = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(2);
    let groups: Option<Vec<String>> = args.get(3).map(|s| s.split(',').map(str::to_string).collect());

    let contents =
        std::fs::read_to_string(graph_file).with_context(|| format!("reading todo graph {graph_file:?}"))?;
    let spec: GraphSpec =
        serde_yaml::from_str(&contents).with_context(|| format!("parsing todo graph {graph_file:?}"))?;

    println!("Wolfe scheduler demo");
    println!("====================");
    println!("Graph:     {}", graph_file);
    println!("Executors: {}", executor_count);
    println!();

    let roots = build_graph(spec)?;

    let junk_yard = InMemoryJunkYard::new();
    let engine = Arc::new(Engine::new(Box::new(junk_yard.clone())));

    for root in &roots {
        let root_id = engine.enter_todo(root).await?;
        println!("entered {:?} as job {}", root.desc(), root_id);
    }
    println!();

    let mut handles = Vec::new();
    for i in 0..executor_count {
        let executor = Executor::new(format!("worker-{i}"), groups.clone());
        handles.push(tokio::spawn(run_executor(Arc::clone(&engine), executor)));
    }

    // The demo has no natural end condition (executors poll forever, same
    // as a real deployment would) — give them a few seconds to drain the
    // graph, then stop and report what finished.
    tokio::time::sleep(Duration::from_secs(5)).await;
    for handle in handles {
        handle.abort();
    }

    println!();
    println!("finished jobs:");
    for job in junk_yard.finished() {
        println!("  job {} — {:?}", job.id, job.desc);
    }

    Ok(())
}
