//! Concurrent DAG walker
//!
//! Each run takes an immutable snapshot of the project's link map and a
//! per-node atomic in-degree counter. A node executes exactly once, when
//! its counter reaches zero; finished nodes decrement their children and
//! fan out concurrently. The top-level call returns only after every
//! spawned subtree has completed.
//!
//! The counters form a deterministic join-barrier under concurrent
//! fan-in. Nodes whose producers never run (e.g. an upstream edge from
//! outside the reachable subgraph) keep a positive counter and are
//! skipped.

use crate::models::{OpResult, Project, Task, TaskId};
use crate::runner::TaskRunner;
use futures::future::BoxFuture;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Executes a project's task graph through a [`TaskRunner`]
pub struct DagExecutor {
    runner: Arc<dyn TaskRunner>,
}

/// Per-run shared state: the edge snapshot never changes, only the
/// counters do.
struct RunState {
    tasks: HashMap<TaskId, Task>,
    edges: BTreeMap<TaskId, Vec<TaskId>>,
    pending: HashMap<TaskId, AtomicUsize>,
    runner: Arc<dyn TaskRunner>,
}

impl DagExecutor {
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self { runner }
    }

    /// Walk the graph from `start_task_id`, running every task whose
    /// upstream edges have all been released. Returns once the whole
    /// spawned subtree has finished.
    pub async fn run_dag(&self, project: &Project) -> OpResult {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("dag_run", project = %project.name, %run_id);

        async {
            let state = Arc::new(self.snapshot(project));
            let start = project.start_task_id;

            let blocked = state
                .pending
                .get(&start)
                .map(|counter| counter.load(Ordering::Acquire) > 0)
                .unwrap_or(false);
            if blocked {
                warn!(
                    start_task_id = start,
                    "start task has unreleased upstream edges, skipping run"
                );
                return OpResult::ok();
            }

            info!(start_task_id = start, "starting DAG walk");
            visit(state, start).await;
            info!("DAG walk complete");
            OpResult::ok()
        }
        .instrument(span)
        .await
    }

    fn snapshot(&self, project: &Project) -> RunState {
        let tasks = project
            .tasks
            .iter()
            .map(|task| (task.id, task.clone()))
            .collect();
        let edges = project.links.clone();

        let mut pending: HashMap<TaskId, usize> = HashMap::new();
        for task in &project.tasks {
            pending.entry(task.id).or_insert(0);
        }
        for targets in project.links.values() {
            for &target in targets {
                *pending.entry(target).or_insert(0) += 1;
            }
        }

        RunState {
            tasks,
            edges,
            pending: pending
                .into_iter()
                .map(|(id, count)| (id, AtomicUsize::new(count)))
                .collect(),
            runner: self.runner.clone(),
        }
    }
}

fn visit(state: Arc<RunState>, id: TaskId) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        let Some(task) = state.tasks.get(&id) else {
            error!(task_id = id, "no task with this id, abandoning branch");
            return;
        };

        match state
            .runner
            .execute(task.task_type, &task.file_path, &task.properties)
            .await
        {
            Ok(output) => debug!(task_id = id, bytes = output.len(), "captured task output"),
            // Traversal proceeds regardless of execution failure
            Err(err) => error!(task_id = id, error = %err, "task execution failed"),
        }

        let Some(children) = state.edges.get(&id) else {
            return;
        };

        let mut handles = Vec::new();
        for &child in children {
            let Some(counter) = state.pending.get(&child) else {
                continue;
            };
            // Release the edge; the last released edge spawns the child
            if counter.fetch_sub(1, Ordering::AcqRel) == 1 {
                handles.push(tokio::spawn(visit(state.clone(), child)));
            }
        }

        for handle in handles {
            if let Err(err) = handle.await {
                error!(task_id = id, error = %err, "child subtree panicked");
            }
        }
    })
}
