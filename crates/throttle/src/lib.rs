pub mod engine;
pub mod error;
pub mod invoker;

pub use engine::{EventHandler, ThrottleEngine, EXEC_SLOT, TICK_SLOT};
pub use error::ThrottleError;
pub use invoker::{CommandInvoker, TaskInvoker};
