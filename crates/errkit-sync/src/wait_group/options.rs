//! Wait group configuration

use super::counter::WaitCounter;
use errkit_core::{CancelContext, ErrorObserver, NoopObserver};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dispatch strategy for spawned tasks.
///
/// Receives the fully wrapped task and must drive it to completion.
pub type TaskRunner = Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>;

/// A single construction option, applied in order.
pub type WaitGroupOption = Box<dyn FnOnce(&mut WaitGroupOptions)>;

pub(crate) const DEFAULT_NAME: &str = "wait-group";

/// Runner that spawns each task on the current tokio runtime.
pub fn tokio_runner() -> TaskRunner {
    Arc::new(|task: BoxFuture<'static, ()>| {
        tokio::spawn(task);
    })
}

/// Declarative wait group settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitGroupConfig {
    /// Label used in log output
    pub name: Option<String>,

    /// Maximum number of concurrently running spawned tasks (0 = unbounded)
    pub task_limit: usize,

    /// Cancel the group context on the first task error
    pub stop_on_error: bool,
}

impl WaitGroupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_task_limit(mut self, limit: usize) -> Self {
        self.task_limit = limit;
        self
    }

    pub fn with_stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }
}

/// Settings collected from [`WaitGroupOption`]s.
pub struct WaitGroupOptions {
    pub(crate) counter: Option<WaitCounter>,
    pub(crate) task_limit: usize,
    pub(crate) runner: TaskRunner,
    pub(crate) stop_on_error: bool,
    pub(crate) parent: Option<CancelContext>,
    pub(crate) name: String,
    pub(crate) observer: Arc<dyn ErrorObserver>,
}

impl Default for WaitGroupOptions {
    fn default() -> Self {
        Self {
            counter: None,
            task_limit: 0,
            runner: tokio_runner(),
            stop_on_error: false,
            parent: None,
            name: DEFAULT_NAME.to_string(),
            observer: Arc::new(NoopObserver),
        }
    }
}

impl WaitGroupOptions {
    pub(crate) fn apply(options: impl IntoIterator<Item = WaitGroupOption>) -> Self {
        let mut resolved = Self::default();
        for option in options {
            option(&mut resolved);
        }
        resolved
    }
}

/// Count on an externally owned counter instead of a private one.
pub fn with_counter(counter: WaitCounter) -> WaitGroupOption {
    Box::new(move |options: &mut WaitGroupOptions| options.counter = Some(counter))
}

/// Bound concurrently running spawned tasks; `0` removes the bound.
pub fn with_task_limit(limit: usize) -> WaitGroupOption {
    Box::new(move |options: &mut WaitGroupOptions| options.task_limit = limit)
}

/// Replace `tokio::spawn` with a custom dispatch strategy.
pub fn with_task_runner<F>(runner: F) -> WaitGroupOption
where
    F: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
{
    Box::new(move |options: &mut WaitGroupOptions| options.runner = Arc::new(runner))
}

/// Cancel the group context as soon as a task reports an error.
pub fn with_stop_on_error() -> WaitGroupOption {
    Box::new(|options: &mut WaitGroupOptions| options.stop_on_error = true)
}

/// Derive the group context from `parent`.
pub fn with_parent_context(parent: CancelContext) -> WaitGroupOption {
    Box::new(move |options: &mut WaitGroupOptions| options.parent = Some(parent))
}

pub fn with_name(name: impl Into<String>) -> WaitGroupOption {
    let name = name.into();
    Box::new(move |options: &mut WaitGroupOptions| options.name = name)
}

/// Report every recorded task error to `observer`.
pub fn with_observer(observer: Arc<dyn ErrorObserver>) -> WaitGroupOption {
    Box::new(move |options: &mut WaitGroupOptions| options.observer = observer)
}

/// Apply the settings of a [`WaitGroupConfig`].
pub fn with_config(config: WaitGroupConfig) -> WaitGroupOption {
    Box::new(move |options: &mut WaitGroupOptions| {
        if let Some(name) = config.name {
            options.name = name;
        }
        options.task_limit = config.task_limit;
        options.stop_on_error = config.stop_on_error;
    })
}
