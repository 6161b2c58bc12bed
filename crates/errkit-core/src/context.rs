//! Cancellation context carrying a cancellation cause

use crate::SharedError;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;

/// Error reported by a cancelled [`CancelContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("context canceled")]
pub struct Canceled;

struct Inner {
    token: CancellationToken,
    cause: OnceLock<Option<SharedError>>,
    parent: Option<CancelContext>,
}

/// Cooperative cancellation signal with an optional cause.
///
/// Cloning yields a handle to the same context. Cancelling a context cancels
/// all of its children; cancelling a child leaves the parent untouched.
#[derive(Clone)]
pub struct CancelContext {
    inner: Arc<Inner>,
}

impl CancelContext {
    /// A root context that is never cancelled by anything but itself.
    pub fn background() -> Self {
        Self {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                cause: OnceLock::new(),
                parent: None,
            }),
        }
    }

    pub fn child(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                cause: OnceLock::new(),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Cancel with an optional cause.
    ///
    /// Only the first call has an effect; returns whether this call fired.
    pub fn cancel(&self, cause: Option<SharedError>) -> bool {
        if self.inner.token.is_cancelled() {
            return false;
        }
        if self.inner.cause.set(cause).is_err() {
            return false;
        }
        self.inner.token.cancel();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Resolves once the context (or one of its ancestors) is cancelled.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    pub fn err(&self) -> Option<Canceled> {
        self.is_cancelled().then_some(Canceled)
    }

    /// The recorded cancellation cause.
    ///
    /// `None` while the context is live. Once cancelled, returns the cause
    /// passed to [`cancel`](Self::cancel), a cancelled ancestor's cause when
    /// cancellation came from above, and [`Canceled`] otherwise.
    pub fn cause(&self) -> Option<SharedError> {
        if !self.is_cancelled() {
            return None;
        }
        match self.inner.cause.get() {
            Some(Some(cause)) => Some(cause.clone()),
            Some(None) => Some(Arc::new(Canceled)),
            None => match &self.inner.parent {
                Some(parent) => parent.cause(),
                None => Some(Arc::new(Canceled)),
            },
        }
    }

    /// True when both handles refer to the same context.
    pub fn same_as(&self, other: &CancelContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for CancelContext {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for CancelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelContext")
            .field("cancelled", &self.is_cancelled())
            .field("root", &self.inner.parent.is_none())
            .finish()
    }
}
