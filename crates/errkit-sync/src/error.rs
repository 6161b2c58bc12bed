//! Errors produced by the wait group itself

use errkit_core::BoxError;
use std::any::Any;

/// Outcome of a spawned task
pub type TaskResult = Result<(), BoxError>;

/// Failure of a task that did not return its own error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task panicked: {message}")]
    Panicked { message: String },
}

impl TaskError {
    /// Build from a panic payload caught by `catch_unwind`.
    pub fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panicked { message }
    }
}
