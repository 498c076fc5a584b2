//! Persistence collaborator seam
//!
//! The real project storage lives behind the CRUD layer; the engine only
//! needs these four operations, with last-write-wins semantics.

use crate::models::Project;
use std::collections::HashMap;
use std::sync::Mutex;

/// Project persistence operations the engine depends on
pub trait ProjectStore: Send + Sync {
    fn load_by_name(&self, name: &str) -> Option<Project>;
    fn save(&self, project: Project);
    fn delete_by_name(&self, name: &str);
    fn all(&self) -> Vec<Project>;
}

/// In-process store backed by a map, keyed by project name
#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<String, Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn load_by_name(&self, name: &str) -> Option<Project> {
        self.projects.lock().unwrap().get(name).cloned()
    }

    fn save(&self, project: Project) {
        self.projects
            .lock()
            .unwrap()
            .insert(project.name.clone(), project);
    }

    fn delete_by_name(&self, name: &str) {
        self.projects.lock().unwrap().remove(name);
    }

    fn all(&self) -> Vec<Project> {
        self.projects.lock().unwrap().values().cloned().collect()
    }
}
