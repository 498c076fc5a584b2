//! Core data models for the pipeflow workflow engine

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Input validation limits for project documents
pub const MAX_DOCUMENT_SIZE: usize = 1_048_576; // 1 MB
pub const MAX_TASK_COUNT: usize = 1_000;
pub const MAX_PROJECT_NAME_LEN: usize = 128;

/// Task identifier, unique within a project
pub type TaskId = u32;

/// A project: a named task graph plus its schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Adjacency by out-edge: task id -> ordered downstream task ids
    #[serde(default)]
    pub links: BTreeMap<TaskId, Vec<TaskId>>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub schedule: Schedule,
    /// Interval between successive runs, in milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
    #[serde(default)]
    pub start_task_id: TaskId,
}

fn default_period_ms() -> u64 {
    60_000
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tasks: Vec::new(),
            links: BTreeMap::new(),
            status: ProjectStatus::Invalid,
            schedule: Schedule::Unscheduled,
            period_ms: default_period_ms(),
            start_task_id: 0,
        }
    }

    /// Apply a status transition, rejecting anything outside the
    /// legal lifecycle Invalid -> Ready -> Running -> Ready.
    pub fn transition(&mut self, to: ProjectStatus) -> crate::error::Result<()> {
        use ProjectStatus::*;
        match (self.status, to) {
            (Invalid, Ready) | (Ready, Running) | (Running, Ready) => {
                self.status = to;
                Ok(())
            }
            (from, to) => Err(EngineError::IllegalTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// A unit of work: one external script invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub file_path: String,
    /// Display coordinates, opaque to the engine
    #[serde(default)]
    pub x_location: i32,
    #[serde(default)]
    pub y_location: i32,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    /// CLI arguments passed to the script
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Script flavor, selecting the execution prefix
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskType {
    Java,
    #[default]
    Bash,
    Unknown,
}

/// Project readiness status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectStatus {
    #[default]
    Invalid,
    Ready,
    Running,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Invalid => write!(f, "INVALID"),
            ProjectStatus::Ready => write!(f, "READY"),
            ProjectStatus::Running => write!(f, "RUNNING"),
        }
    }
}

/// First-fire instant of a project's recurring trigger
///
/// An explicit sum type so "never scheduled" is distinguishable from a
/// far-away date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", content = "at", rename_all = "lowercase")]
pub enum Schedule {
    #[default]
    Unscheduled,
    At(DateTime<Utc>),
}

/// Operation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpStatus {
    Ok,
    Error,
}

/// Value returned by every engine operation: a status plus ordered
/// human-readable messages. Expected failures never panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
    pub status: OpStatus,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl OpResult {
    pub fn ok() -> Self {
        Self {
            status: OpStatus::Ok,
            messages: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OpStatus::Error,
            messages: vec![message.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OpStatus::Ok
    }
}

impl From<EngineError> for OpResult {
    fn from(err: EngineError) -> Self {
        OpResult::error(err.to_string())
    }
}
