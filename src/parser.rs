//! JSON parser with validation for project documents
//!
//! The boundary layer exchanges projects as JSON. Parsing enforces the
//! input limits before a document reaches the engine: document size,
//! task count, a non-blank project name, and unique task ids.

use crate::error::{EngineError, Result};
use crate::models::{Project, MAX_DOCUMENT_SIZE, MAX_PROJECT_NAME_LEN, MAX_TASK_COUNT};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parse and validate a project document from a file
pub fn parse_project_file<P: AsRef<Path>>(path: P) -> Result<Project> {
    let content = fs::read_to_string(path)?;
    parse_project_json(&content)
}

/// Parse and validate a project document from a JSON string
pub fn parse_project_json(content: &str) -> Result<Project> {
    if content.len() > MAX_DOCUMENT_SIZE {
        return Err(EngineError::DocumentTooLarge {
            size: content.len(),
            limit: MAX_DOCUMENT_SIZE,
        });
    }

    let project: Project = serde_json::from_str(content)?;
    validate_project(&project)?;
    Ok(project)
}

fn validate_project(project: &Project) -> Result<()> {
    if project.name.trim().is_empty() {
        return Err(EngineError::InvalidProjectName("blank".to_string()));
    }
    if project.name.len() > MAX_PROJECT_NAME_LEN {
        return Err(EngineError::InvalidProjectName(format!(
            "exceeds {MAX_PROJECT_NAME_LEN} characters"
        )));
    }
    if project.tasks.len() > MAX_TASK_COUNT {
        return Err(EngineError::TaskCountExceeded {
            count: project.tasks.len(),
            limit: MAX_TASK_COUNT,
        });
    }

    let mut seen = HashSet::new();
    for task in &project.tasks {
        if !seen.insert(task.id) {
            return Err(EngineError::DuplicateTaskId { id: task.id });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProjectStatus, TaskType};

    const DOC: &str = r#"
    {
        "name": "nightly-etl",
        "description": "extract and load",
        "tasks": [
            {"id": 0, "file_path": "extract.sh", "type": "BASH"},
            {"id": 1, "file_path": "load.jar", "type": "JAVA", "properties": ["--fast"]}
        ],
        "links": {"0": [1]},
        "period_ms": 60000,
        "start_task_id": 0
    }"#;

    #[test]
    fn test_parse_project_document() {
        let project = parse_project_json(DOC).unwrap();
        assert_eq!(project.name, "nightly-etl");
        assert_eq!(project.tasks.len(), 2);
        assert_eq!(project.tasks[1].task_type, TaskType::Java);
        assert_eq!(project.tasks[1].properties, vec!["--fast"]);
        assert_eq!(project.links[&0], vec![1]);
        // Omitted fields take their defaults
        assert_eq!(project.status, ProjectStatus::Invalid);
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = parse_project_json(r#"{"name": "  "}"#);
        assert!(matches!(result, Err(EngineError::InvalidProjectName(_))));
    }

    #[test]
    fn test_duplicate_task_ids_rejected() {
        let doc = r#"
        {
            "name": "p",
            "tasks": [
                {"id": 3, "file_path": "a.sh"},
                {"id": 3, "file_path": "b.sh"}
            ]
        }"#;
        let result = parse_project_json(doc);
        assert!(matches!(result, Err(EngineError::DuplicateTaskId { id: 3 })));
    }

    #[test]
    fn test_oversized_document_rejected() {
        let padding = "x".repeat(MAX_DOCUMENT_SIZE);
        let doc = format!(r#"{{"name": "p", "description": "{padding}"}}"#);
        let result = parse_project_json(&doc);
        assert!(matches!(result, Err(EngineError::DocumentTooLarge { .. })));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = parse_project_json("{not json");
        assert!(matches!(result, Err(EngineError::JsonParse(_))));
    }

    #[test]
    fn test_parse_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, DOC).unwrap();

        let project = parse_project_file(&path).unwrap();
        assert_eq!(project.name, "nightly-etl");
    }
}
