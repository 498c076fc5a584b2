//! Graph model for a project's task DAG

use crate::error::{EngineError, Result};
use crate::models::{Project, TaskId};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// In-memory graph built from a project's tasks and links
///
/// Building the model enforces the structural invariants: task ids are
/// unique, and every id referenced by the link map resolves to a declared
/// task. Cycle search is a separate pass over the built graph.
#[derive(Debug)]
pub struct GraphModel {
    graph: DiGraph<TaskId, ()>,
    task_indices: HashMap<TaskId, NodeIndex>,
}

impl GraphModel {
    /// Build the graph from a project
    pub fn build(project: &Project) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut task_indices = HashMap::new();

        for task in &project.tasks {
            if task_indices.contains_key(&task.id) {
                return Err(EngineError::DuplicateTaskId { id: task.id });
            }
            let index = graph.add_node(task.id);
            task_indices.insert(task.id, index);
        }

        for (&source, targets) in &project.links {
            let source_index = *task_indices
                .get(&source)
                .ok_or(EngineError::DanglingReference { id: source })?;
            for &target in targets {
                let target_index = *task_indices
                    .get(&target)
                    .ok_or(EngineError::DanglingReference { id: target })?;
                graph.add_edge(source_index, target_index, ());
            }
        }

        Ok(Self {
            graph,
            task_indices,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Search the whole declared graph for a cycle, exploring from
    /// `start_id` first so a cycle reachable from the start task is the
    /// one reported. Returns the path trace of the first cycle found.
    pub fn find_cycle(&self, start_id: TaskId) -> Option<String> {
        // visited: present = seen; true = on the active recursion path
        let mut visited = HashMap::new();
        let mut path = Vec::new();

        let start = self.task_indices.get(&start_id).copied();
        let roots = start.into_iter().chain(self.graph.node_indices());

        for node in roots {
            if !visited.contains_key(&node) {
                if let Some(trace) = self.dfs_find_cycle(node, &mut visited, &mut path) {
                    return Some(trace);
                }
            }
        }

        None
    }

    fn dfs_find_cycle(
        &self,
        node: NodeIndex,
        visited: &mut HashMap<NodeIndex, bool>,
        path: &mut Vec<String>,
    ) -> Option<String> {
        if let Some(&on_path) = visited.get(&node) {
            if on_path {
                // Revisited while still on the active path: back-edge
                path.push(self.graph[node].to_string());
                return Some(path.join(" -> "));
            }
            // Fully explored earlier, do not re-enter shared sub-DAGs
            return None;
        }

        visited.insert(node, true);
        path.push(self.graph[node].to_string());

        for neighbor in self.graph.neighbors(node) {
            if let Some(trace) = self.dfs_find_cycle(neighbor, visited, path) {
                return Some(trace);
            }
        }

        path.pop();
        visited.insert(node, false);
        None
    }
}
