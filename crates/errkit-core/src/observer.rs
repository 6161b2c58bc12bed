//! ErrorObserver trait - hook notified whenever an error is produced
//!
//! Observers are injected explicitly: into an [`ErrorFactory`] for errors it
//! builds, or into a wait group for errors its tasks report. There is no
//! process-wide default.

use crate::error::{ContextualError, add_fields};
use crate::field::Field;
use crate::{BoxError, SharedError};
use std::error::Error as StdError;
use std::sync::Arc;

/// Receives every error produced by the component it is attached to.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorObserver: Send + Sync {
    /// Called once per produced error, after construction.
    fn on_error(&self, err: &(dyn StdError + 'static));
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ErrorObserver for NoopObserver {
    fn on_error(&self, _err: &(dyn StdError + 'static)) {}
}

/// Observer that reports each error as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ErrorObserver for TracingObserver {
    fn on_error(&self, err: &(dyn StdError + 'static)) {
        match ContextualError::find_in(err) {
            Some(contextual) if !contextual.fields().is_empty() => {
                let fields = contextual.render(Default::default());
                tracing::warn!(error = %err, fields = %fields, "error reported");
            }
            _ => tracing::warn!(error = %err, "error reported"),
        }
    }
}

/// Builds contextual errors and reports each one to an observer.
#[derive(Clone)]
pub struct ErrorFactory {
    observer: Arc<dyn ErrorObserver>,
}

impl ErrorFactory {
    pub fn new(observer: Arc<dyn ErrorObserver>) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &Arc<dyn ErrorObserver> {
        &self.observer
    }

    fn report(&self, err: ContextualError) -> ContextualError {
        self.observer.on_error(&err);
        err
    }

    pub fn new_error(
        &self,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> ContextualError {
        self.report(ContextualError::new(message).with_fields(fields))
    }

    pub fn wrap<E>(
        &self,
        cause: E,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> ContextualError
    where
        E: StdError + Send + Sync + 'static,
    {
        self.report(ContextualError::wrap(cause, message).with_fields(fields))
    }

    pub fn wrap_shared(
        &self,
        cause: Option<SharedError>,
        message: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> ContextualError {
        self.report(ContextualError::with_cause(cause, message).with_fields(fields))
    }

    pub fn add_fields(
        &self,
        err: BoxError,
        fields: impl IntoIterator<Item = Field>,
    ) -> ContextualError {
        self.report(add_fields(err, fields))
    }
}

impl Default for ErrorFactory {
    fn default() -> Self {
        Self::new(Arc::new(NoopObserver))
    }
}

impl std::fmt::Debug for ErrorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorFactory").finish_non_exhaustive()
    }
}
