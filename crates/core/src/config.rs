//! Listener configuration.
//!
//! Values arrive through CLI flags with env-var fallbacks (see the
//! `tickgate-listener` binary); these structs are the typed form the
//! engine and invoker consume.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

// ── Throttle ──────────────────────────────────────────────────

/// Tick-aggregation and rate-cap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Ticks that make up one scheduling period.
    pub ticks_per_period: u64,
    /// Maximum task executions per cycle.
    pub max_executions: u64,
    /// Periods that make up one full cycle.
    pub ticks_in_cycle: u64,
    /// Environment identifier forwarded to the task.
    pub env_id: String,
}

impl ThrottleConfig {
    /// Reject degenerate settings (zero-length period or cycle).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.ticks_in_cycle == 0 {
            return Err(ConfigError::ZeroCycle);
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  throttle: ticks_per_period={}, max_executions={}, ticks_in_cycle={}",
            self.ticks_per_period,
            self.max_executions,
            self.ticks_in_cycle
        );
        tracing::info!("  env_id:   {}", self.env_id);
    }
}

// ── Task ──────────────────────────────────────────────────────

/// The external command launched at each allowed period boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Environment variable that carries the env id into the task.
    pub env_var: String,
}

impl TaskConfig {
    /// Split a full command line (`program arg1 arg2 ...`) into a task config.
    pub fn from_command_line(command: &str, env_var: &str) -> Result<Self, ConfigError> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or(ConfigError::EmptyTaskCommand)?
            .to_string();
        Ok(Self {
            program,
            args: parts.map(str::to_string).collect(),
            env_var: env_var.to_string(),
        })
    }
}
