//! External script execution

use crate::models::TaskType;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runner seam for task execution
///
/// Implementations spawn the external program for a task and return its
/// captured standard output. The exit status is not part of the contract;
/// a failing script still yields its output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn execute(
        &self,
        task_type: TaskType,
        path: &str,
        properties: &[String],
    ) -> anyhow::Result<String>;
}

/// Process-spawning runner for local scripts
///
/// Commands are assembled per task type: `java -jar <path>` for Java
/// archives, `./<path>` for shell scripts. No timeout is enforced and the
/// exit status is logged but not inspected.
#[derive(Debug, Clone, Default)]
pub struct ScriptRunner {
    workdir: Option<PathBuf>,
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run scripts with the given working directory (the scripts
    /// location; `./<path>` resolves against it).
    pub fn with_workdir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(workdir.into()),
        }
    }

    fn command_for(&self, task_type: TaskType, path: &str) -> Option<Command> {
        let mut cmd = match task_type {
            TaskType::Java => {
                let mut cmd = Command::new("java");
                cmd.arg("-jar").arg(path);
                cmd
            }
            TaskType::Bash => Command::new(format!("./{path}")),
            TaskType::Unknown => return None,
        };
        if let Some(workdir) = &self.workdir {
            cmd.current_dir(workdir);
        }
        Some(cmd)
    }
}

#[async_trait]
impl TaskRunner for ScriptRunner {
    async fn execute(
        &self,
        task_type: TaskType,
        path: &str,
        properties: &[String],
    ) -> anyhow::Result<String> {
        let Some(mut cmd) = self.command_for(task_type, path) else {
            warn!(path, "cannot run a script of unknown type");
            return Ok(format!("Cannot run this script: {path}"));
        };
        cmd.args(properties);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        info!(?task_type, path, "executing script");
        let output = cmd.output().await?;

        // Captured output is returned uninspected; the exit status is
        // only surfaced in the log.
        debug!(path, exit_code = ?output.status.code(), "script finished");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
