//! Workflow validation operations
//!
//! Both checks are pure: they never mutate the project and repeated calls
//! on an unmodified project return identical results.

use crate::graph::GraphModel;
use crate::models::{OpResult, Project};

/// Structural validity: every id referenced anywhere in the link map
/// (source or target) must resolve to a declared task id, and task ids
/// must be unique. "Known id" deliberately means the declared task-id
/// set, not the link-map key set: a target that is a task but never a
/// link source is valid.
pub fn is_graph_valid(project: &Project) -> bool {
    GraphModel::build(project).is_ok()
}

/// Acyclicity: depth-first search over the declared graph, exploring from
/// `start_task_id` first. Returns ERROR with a path trace (`"a -> b -> a"`)
/// on the first cycle found, including length-1 self-loops. A structurally
/// broken graph cannot be traversed and is reported as ERROR as well.
pub fn is_graph_cycled(project: &Project) -> OpResult {
    let model = match GraphModel::build(project) {
        Ok(model) => model,
        Err(err) => return err.into(),
    };

    match model.find_cycle(project.start_task_id) {
        Some(trace) => crate::error::EngineError::Cyclic { trace }.into(),
        None => OpResult::ok(),
    }
}
