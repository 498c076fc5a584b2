//! Periodic trigger management for running projects
//!
//! One background trigger per running project, keyed by project name in a
//! process-local registry. Each firing spawns a DAG walk fire-and-forget:
//! nothing delays the next tick while a walk is still in flight, so
//! overlapping runs of the same project are possible. `stop` only cancels
//! the trigger; walks already spawned run to completion.

use crate::error::EngineError;
use crate::executor::DagExecutor;
use crate::models::{OpResult, Project, ProjectStatus, Schedule};
use crate::runner::TaskRunner;
use crate::store::ProjectStore;
use crate::validator;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Owns the recurring triggers and drives the executor
pub struct ProjectScheduler {
    store: Arc<dyn ProjectStore>,
    executor: Arc<DagExecutor>,
    triggers: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl ProjectScheduler {
    pub fn new(store: Arc<dyn ProjectStore>, runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            store,
            executor: Arc::new(DagExecutor::new(runner)),
            triggers: Mutex::new(HashMap::new()),
        }
    }

    /// Start the recurring trigger for a project
    ///
    /// Rejected while the project is already `Running` (the existing
    /// trigger is left untouched) or still `Invalid`. The cycle check
    /// runs first, the structural check second; on success the project is
    /// marked `Running` and saved.
    pub async fn start(&self, project_name: &str) -> OpResult {
        let Some(project) = self.store.load_by_name(project_name) else {
            return EngineError::ProjectNotFound(project_name.to_string()).into();
        };
        self.start_project(project).await
    }

    async fn start_project(&self, mut project: Project) -> OpResult {
        if project.status == ProjectStatus::Running || project.status == ProjectStatus::Invalid {
            return EngineError::InvalidState {
                name: project.name.clone(),
                status: project.status.to_string(),
            }
            .into();
        }

        let cycled = validator::is_graph_cycled(&project);
        if !cycled.is_ok() {
            return cycled;
        }
        if !validator::is_graph_valid(&project) {
            return OpResult::error(format!("Project '{}' has an invalid graph", project.name));
        }

        let next_fire = next_fire_after(project.schedule, project.period_ms, Utc::now());
        let handle = self.spawn_trigger(&project, next_fire);
        self.triggers
            .lock()
            .unwrap()
            .insert(project.name.clone(), handle);

        if let Err(err) = project.transition(ProjectStatus::Running) {
            return err.into();
        }
        info!(
            project = %project.name,
            %next_fire,
            period_ms = project.period_ms,
            "registered periodic trigger"
        );
        self.store.save(project);
        OpResult::ok()
    }

    fn spawn_trigger(&self, project: &Project, next_fire: DateTime<Utc>) -> JoinHandle<()> {
        let executor = self.executor.clone();
        let project = project.clone();
        let delay = (next_fire - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let period = Duration::from_millis(project.period_ms.max(1));

        tokio::spawn(async move {
            let first_tick = tokio::time::Instant::now() + delay;
            let mut interval = tokio::time::interval_at(first_tick, period);
            loop {
                interval.tick().await;
                // Fire-and-forget: an in-flight walk does not block the
                // next tick.
                let executor = executor.clone();
                let project = project.clone();
                tokio::spawn(async move {
                    executor.run_dag(&project).await;
                });
            }
        })
    }

    /// Cancel the trigger registered for a project
    ///
    /// `NoActiveSchedule` when nothing is tracked in this process, which
    /// can happen even if the persisted status says `Running` (e.g. after
    /// a crash that lost the in-memory registry).
    pub async fn stop(&self, project_name: &str) -> OpResult {
        let Some(mut project) = self.store.load_by_name(project_name) else {
            return EngineError::ProjectNotFound(project_name.to_string()).into();
        };

        let handle = self.triggers.lock().unwrap().remove(project_name);
        let Some(handle) = handle else {
            return EngineError::NoActiveSchedule(project_name.to_string()).into();
        };
        handle.abort();

        if let Err(err) = project.transition(ProjectStatus::Ready) {
            return err.into();
        }
        info!(project = %project.name, "cancelled periodic trigger");
        self.store.save(project);
        OpResult::ok()
    }

    /// Startup recovery: re-arm every persisted project whose status says
    /// `Running`. The first fire is reconciled against wall-clock elapsed
    /// time, so a restart does not replay the original start date.
    /// Returns the number of projects re-armed.
    pub async fn recover(&self) -> usize {
        let mut recovered = 0;
        for mut project in self.store.all() {
            if project.status != ProjectStatus::Running {
                continue;
            }
            let name = project.name.clone();
            if project.transition(ProjectStatus::Ready).is_err() {
                continue;
            }
            self.store.save(project.clone());

            let result = self.start_project(project).await;
            if result.is_ok() {
                info!(project = %name, "recovered running project");
                recovered += 1;
            } else {
                warn!(project = %name, messages = ?result.messages, "could not recover project");
            }
        }
        recovered
    }

    /// Whether a trigger is currently registered for the project
    pub fn is_scheduled(&self, project_name: &str) -> bool {
        self.triggers.lock().unwrap().contains_key(project_name)
    }
}

impl Drop for ProjectScheduler {
    fn drop(&mut self) {
        for handle in self.triggers.lock().unwrap().values() {
            handle.abort();
        }
    }
}

/// Compute the first fire instant for a schedule
///
/// A start date in the past advances to the first period boundary at or
/// after `now` instead of replaying from the saved date; an unscheduled
/// project fires immediately.
fn next_fire_after(schedule: Schedule, period_ms: u64, now: DateTime<Utc>) -> DateTime<Utc> {
    match schedule {
        Schedule::Unscheduled => now,
        Schedule::At(start) if start >= now => start,
        Schedule::At(start) => {
            let period = period_ms.max(1);
            let elapsed = (now - start).num_milliseconds().max(0) as u64;
            let periods = elapsed.div_ceil(period);
            start + ChronoDuration::milliseconds(periods.saturating_mul(period) as i64)
        }
    }
}
