//! Errkit Sync Library
//!
//! Concurrency helpers built on `errkit-core`: a supervised wait group that
//! aggregates task errors, bounds concurrency and propagates cancellation.
//!
//! # Example
//!
//! ```rust
//! use errkit_sync::{TaskResult, WaitGroup, with_task_limit};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let wg = WaitGroup::new([with_task_limit(4)]);
//! for _ in 0..8 {
//!     wg.spawn(async { TaskResult::Ok(()) }).await;
//! }
//! assert!(wg.wait().await.is_ok());
//! # }
//! ```

pub mod error;
pub mod wait_group;

// Re-export commonly used types
pub use error::{TaskError, TaskResult};
pub use wait_group::{
    TaskRunner, WaitCounter, WaitGroup, WaitGroupConfig, WaitGroupOption, WaitGroupOptions,
    tokio_runner, with_config, with_counter, with_name, with_observer, with_parent_context,
    with_stop_on_error, with_task_limit, with_task_runner,
};
