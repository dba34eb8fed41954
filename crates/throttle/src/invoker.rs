//! Task invoker seam.
//!
//! The engine launches the scheduled task through this trait so tests can
//! substitute a recording fake without touching the state machine.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use tickgate_core::TaskConfig;

use crate::error::ThrottleError;

#[async_trait]
pub trait TaskInvoker: Send + Sync {
    /// Launch the scheduled task with the environment identifier.
    ///
    /// Fire-and-forget: implementations return once the process has been
    /// spawned; its exit status is never inspected.
    async fn invoke(&self, env_id: &str) -> Result<(), ThrottleError>;
}

/// Spawns the configured external command with `env_var=env_id` set.
pub struct CommandInvoker {
    config: TaskConfig,
}

impl CommandInvoker {
    pub fn new(config: TaskConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TaskInvoker for CommandInvoker {
    async fn invoke(&self, env_id: &str) -> Result<(), ThrottleError> {
        let child = Command::new(&self.config.program)
            .args(&self.config.args)
            .env(&self.config.env_var, env_id)
            .spawn()
            .map_err(|e| ThrottleError::TaskLaunch(format!("{}: {e}", self.config.program)))?;

        // The child keeps running on its own; we never wait on it.
        info!(program = %self.config.program, pid = child.id(), "scheduled task launched");
        Ok(())
    }
}
