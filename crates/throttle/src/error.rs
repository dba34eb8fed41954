//! Throttle engine error types.

use thiserror::Error;

use tickgate_store::StoreError;

#[derive(Debug, Error)]
pub enum ThrottleError {
    #[error("counter store error: {0}")]
    Store(#[from] StoreError),

    #[error("task launch error: {0}")]
    TaskLaunch(String),
}
