//! Error types for the workflow engine

use thiserror::Error;

/// Engine error taxonomy
///
/// Expected failures travel through [`crate::models::OpResult`]; this enum
/// carries the structured form before it is flattened into messages at the
/// operation boundary.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Project or task absent
    #[error("Project with the name '{0}' not found")]
    ProjectNotFound(String),

    /// Task id referenced by the walk does not resolve
    #[error("Task with id {0} not found in project")]
    TaskNotFound(u32),

    /// Operation requested in a status that forbids it
    #[error("Project '{name}' is {status} and cannot be started")]
    InvalidState { name: String, status: String },

    /// Illegal status transition
    #[error("Illegal status transition {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    /// Dangling edge endpoint in the link map
    #[error("Link references unknown task id {id}")]
    DanglingReference { id: u32 },

    /// Duplicate task id inside one project
    #[error("Duplicate task id {id}")]
    DuplicateTaskId { id: u32 },

    /// Cycle found, with path trace
    #[error("Cycle detected: {trace}")]
    Cyclic { trace: String },

    /// Stop requested with no trigger registered in this process
    #[error("No active schedule for project '{0}'")]
    NoActiveSchedule(String),

    /// Project document exceeds the size limit
    #[error("Project document exceeds {limit} bytes (size: {size} bytes)")]
    DocumentTooLarge { size: usize, limit: usize },

    /// Task count exceeds the limit
    #[error("Task count {count} exceeds limit of {limit}")]
    TaskCountExceeded { count: usize, limit: usize },

    /// Project name fails validation
    #[error("Invalid project name: {0}")]
    InvalidProjectName(String),

    /// JSON parse errors
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
