//! End-to-end test: schedule a project whose tasks are real shell
//! scripts and verify the full path from trigger to process output.

use pipeflow::models::{OpStatus, Project, ProjectStatus, Schedule, Task, TaskType};
use pipeflow::runner::ScriptRunner;
use pipeflow::scheduler::ProjectScheduler;
use pipeflow::store::{MemoryStore, ProjectStore};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn write_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "#!/bin/sh").unwrap();
    writeln!(file, "{body}").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn task(id: u32, file_path: &str) -> Task {
    Task {
        id,
        file_path: file_path.to_string(),
        x_location: 0,
        y_location: 0,
        task_type: TaskType::Bash,
        properties: vec![],
    }
}

#[tokio::test]
async fn scheduled_project_runs_scripts_in_dependency_order() {
    let dir = tempfile::tempdir().unwrap();
    // Each script appends its name to a shared log file
    write_script(dir.path(), "extract.sh", "echo extract >> runs.log");
    write_script(dir.path(), "transform.sh", "echo transform >> runs.log");
    write_script(dir.path(), "load.sh", "echo load >> runs.log");

    let mut project = Project::new("etl");
    project.tasks = vec![
        task(0, "extract.sh"),
        task(1, "transform.sh"),
        task(2, "load.sh"),
    ];
    project.links = [(0, vec![1]), (1, vec![2])].into_iter().collect();
    project.period_ms = 100;
    project.schedule = Schedule::Unscheduled;
    project.transition(ProjectStatus::Ready).unwrap();

    let store = Arc::new(MemoryStore::new());
    store.save(project);

    let runner = Arc::new(ScriptRunner::with_workdir(dir.path()));
    let scheduler = ProjectScheduler::new(store.clone(), runner);

    let result = scheduler.start("etl").await;
    assert_eq!(result.status, OpStatus::Ok, "{:?}", result.messages);
    assert_eq!(
        store.load_by_name("etl").unwrap().status,
        ProjectStatus::Running
    );

    // Let at least one full run complete
    tokio::time::sleep(Duration::from_millis(250)).await;
    let stopped = scheduler.stop("etl").await;
    assert_eq!(stopped.status, OpStatus::Ok);
    assert_eq!(
        store.load_by_name("etl").unwrap().status,
        ProjectStatus::Ready
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    let log = std::fs::read_to_string(dir.path().join("runs.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert!(lines.len() >= 3, "log: {lines:?}");
    // Every run preserves the chain order
    let first_run = &lines[..3];
    assert_eq!(first_run, ["extract", "transform", "load"]);
}

#[tokio::test]
async fn cyclic_project_never_starts() {
    let mut project = Project::new("loop");
    project.tasks = vec![task(0, "a.sh"), task(1, "b.sh")];
    project.links = [(0, vec![1]), (1, vec![0])].into_iter().collect();
    project.transition(ProjectStatus::Ready).unwrap();

    let store = Arc::new(MemoryStore::new());
    store.save(project);
    let scheduler = ProjectScheduler::new(store.clone(), Arc::new(ScriptRunner::new()));

    let result = scheduler.start("loop").await;
    assert_eq!(result.status, OpStatus::Error);
    assert!(result.messages[0].contains("Cycle detected"));
    assert!(!scheduler.is_scheduled("loop"));
    assert_eq!(
        store.load_by_name("loop").unwrap().status,
        ProjectStatus::Ready
    );
}

#[tokio::test]
async fn recovery_rearms_persisted_running_project() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "tick.sh", "echo tick >> ticks.log");

    let mut project = Project::new("heartbeat");
    project.tasks = vec![task(0, "tick.sh")];
    project.period_ms = 50;
    project.transition(ProjectStatus::Ready).unwrap();
    project.transition(ProjectStatus::Running).unwrap();

    // Simulates a store left behind by a crashed process: status says
    // RUNNING but no trigger exists in this one.
    let store = Arc::new(MemoryStore::new());
    store.save(project);

    let runner = Arc::new(ScriptRunner::with_workdir(dir.path()));
    let scheduler = ProjectScheduler::new(store.clone(), runner);

    assert_eq!(
        scheduler.stop("heartbeat").await.status,
        OpStatus::Error,
        "nothing is tracked in-process before recovery"
    );

    let recovered = scheduler.recover().await;
    assert_eq!(recovered, 1);
    assert!(scheduler.is_scheduled("heartbeat"));

    tokio::time::sleep(Duration::from_millis(180)).await;
    scheduler.stop("heartbeat").await;

    let log = std::fs::read_to_string(dir.path().join("ticks.log")).unwrap();
    assert!(log.lines().count() >= 2);
}
