//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("task command is empty")]
    EmptyTaskCommand,

    #[error("ticks_per_period must be at least 1")]
    ZeroPeriod,

    #[error("ticks_in_cycle must be at least 1")]
    ZeroCycle,
}
