//! Supervised wait group
//!
//! A [`WaitGroup`] joins a counting barrier with a [`MultiError`]: tasks report
//! their outcome through `done`, and `wait` yields every recorded failure once
//! the count reaches zero. Optional settings bound concurrency, swap the task
//! runner, or cancel the shared context on the first failure.
//!
//! [`MultiError`]: errkit_core::MultiError

mod counter;
mod group;
mod options;


pub use counter::WaitCounter;
pub use group::WaitGroup;
pub use options::{
    TaskRunner, WaitGroupConfig, WaitGroupOption, WaitGroupOptions, tokio_runner, with_config,
    with_counter, with_name, with_observer, with_parent_context, with_stop_on_error,
    with_task_limit, with_task_runner,
};
