//! Supervised wait group

use super::counter::WaitCounter;
use super::options::{TaskRunner, WaitGroupOption, WaitGroupOptions, with_parent_context};
use crate::error::{TaskError, TaskResult};
use errkit_core::{CancelContext, ErrorObserver, MultiError, SharedError};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Semaphore, oneshot};

struct Shared {
    counter: WaitCounter,
    errors: MultiError,
    gate: Option<Arc<Semaphore>>,
    runner: TaskRunner,
    stop_on_error: bool,
    observer: Arc<dyn ErrorObserver>,
    ctx: CancelContext,
    name: String,
    /// A spawned task's `done` hit the misuse panic.
    misused: AtomicBool,
}

/// A counting barrier that collects task errors.
///
/// Every [`add`](Self::add) must be matched by as many
/// [`done`](Self::done) calls; [`wait`](Self::wait) resolves once all of them
/// arrived and yields the collected errors, if any. Clones share state.
#[derive(Clone)]
pub struct WaitGroup {
    shared: Arc<Shared>,
}

impl WaitGroup {
    pub fn new(options: impl IntoIterator<Item = WaitGroupOption>) -> Self {
        Self::from_options(WaitGroupOptions::apply(options))
    }

    /// Build a group whose context is a child of `parent`.
    ///
    /// Returns the group context alongside the group.
    pub fn with_context(
        parent: &CancelContext,
        options: impl IntoIterator<Item = WaitGroupOption>,
    ) -> (CancelContext, Self) {
        let options = std::iter::once(with_parent_context(parent.clone())).chain(options);
        let group = Self::new(options);
        (group.context().clone(), group)
    }

    fn from_options(options: WaitGroupOptions) -> Self {
        let ctx = match &options.parent {
            Some(parent) => parent.child(),
            None => CancelContext::background(),
        };
        let gate = (options.task_limit > 0).then(|| Arc::new(Semaphore::new(options.task_limit)));

        tracing::debug!(
            name = %options.name,
            task_limit = options.task_limit,
            stop_on_error = options.stop_on_error,
            "wait group created"
        );

        Self {
            shared: Arc::new(Shared {
                counter: options.counter.unwrap_or_default(),
                errors: MultiError::new(),
                gate,
                runner: options.runner,
                stop_on_error: options.stop_on_error,
                observer: options.observer,
                ctx,
                name: options.name,
                misused: AtomicBool::new(false),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Context handed to tasks; cancelled by [`stop`](Self::stop).
    pub fn context(&self) -> &CancelContext {
        &self.shared.ctx
    }

    /// # Panics
    ///
    /// If the pending count would become negative.
    pub fn add(&self, delta: i64) {
        self.shared.counter.add(delta);
    }

    /// Mark one unit of work finished, recording `err` if present.
    ///
    /// The error is recorded before the count drops, so a released
    /// [`wait`](Self::wait) always sees it. The observer is told afterwards.
    ///
    /// # Panics
    ///
    /// If called more times than [`add`](Self::add) allowed. Nothing is
    /// recorded or observed in that case.
    pub fn done(&self, err: Option<SharedError>) {
        self.shared.counter.done_then(|| {
            if let Some(err) = &err {
                self.shared.errors.safe_add(Some(err.clone()));
                if self.shared.stop_on_error {
                    self.stop(Some(err.clone()));
                }
            }
        });
        if let Some(err) = err {
            tracing::warn!(name = %self.shared.name, error = %err, "task failed");
            self.shared.observer.on_error(err.as_ref());
        }
    }

    /// Run `task` through the task runner, counting it in the group.
    ///
    /// With a task limit configured this waits for a free slot first.
    ///
    /// A task finishing after the group was already over-released by
    /// [`done`](Self::done) cannot panic in the caller from inside the
    /// runner; the misuse is kept and [`wait`](Self::wait) panics instead.
    pub async fn spawn<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        self.spawn_with_context(move |_| task).await;
    }

    /// Like [`spawn`](Self::spawn), handing the group context to the task.
    pub async fn spawn_with_context<F, Fut>(&self, task: F)
    where
        F: FnOnce(CancelContext) -> Fut,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        let future = task(self.shared.ctx.clone());

        let permit = match &self.shared.gate {
            Some(gate) => gate.clone().acquire_owned().await.ok(),
            None => None,
        };

        self.add(1);

        let group = self.clone();
        let job = async move {
            let err: Option<SharedError> = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(Arc::from(err)),
                Err(payload) => {
                    let err = TaskError::panicked(payload);
                    tracing::warn!(name = %group.shared.name, error = %err, "task panicked");
                    Some(Arc::new(err))
                }
            };
            let released = std::panic::catch_unwind(AssertUnwindSafe(|| group.done(err)));
            drop(permit);
            if released.is_err() {
                let name = &group.shared.name;
                tracing::error!(name = %name, "task finished on a released wait group");
                group.shared.misused.store(true, Ordering::SeqCst);
            }
        };

        (self.shared.runner)(Box::pin(job));
    }

    /// Resolve once every pending task is done.
    ///
    /// Cancels the group context afterwards, carrying the collected errors as
    /// its cause when there are any.
    ///
    /// # Panics
    ///
    /// If a spawned task called `done` on an already released group.
    pub async fn wait(&self) -> Result<(), MultiError> {
        self.shared.counter.wait().await;
        if self.shared.misused.load(Ordering::SeqCst) {
            panic!("errkit: negative WaitGroup counter");
        }

        let result = self.shared.errors.clone().into_result();
        let cause = result
            .as_ref()
            .err()
            .map(|errors| Arc::new(errors.clone()) as SharedError);

        tracing::debug!(
            name = %self.shared.name,
            errors = self.shared.errors.safe_len(),
            "wait group released"
        );

        self.stop(cause);
        result
    }

    /// [`wait`](Self::wait) as a one-shot channel, for use in `select!`.
    pub fn wait_channel(&self) -> oneshot::Receiver<Result<(), MultiError>> {
        let (tx, rx) = oneshot::channel();
        let group = self.clone();
        tokio::spawn(async move {
            let _ = tx.send(group.wait().await);
        });
        rx
    }

    /// Cancel the group context. Only the first call has an effect.
    pub fn stop(&self, cause: Option<SharedError>) {
        if self.shared.ctx.cancel(cause) {
            tracing::debug!(name = %self.shared.name, "wait group stopped");
        }
    }

    pub fn pending(&self) -> i64 {
        self.shared.counter.pending()
    }

    /// Free slots of the task limit gate, `None` without a limit.
    pub fn available_slots(&self) -> Option<usize> {
        self.shared.gate.as_ref().map(|gate| gate.available_permits())
    }

    pub fn error_count(&self) -> usize {
        self.shared.errors.safe_len()
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl std::fmt::Debug for WaitGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitGroup")
            .field("name", &self.shared.name)
            .field("pending", &self.pending())
            .field("errors", &self.error_count())
            .field("stop_on_error", &self.shared.stop_on_error)
            .finish_non_exhaustive()
    }
}
