//! Errkit
//!
//! Structured error context, multi-error aggregation and supervised wait
//! groups.
//!
//! - `errkit-core`: typed fields, contextual errors, chain walking,
//!   [`MultiError`] and the [`CancelContext`].
//! - `errkit-sync`: the [`WaitGroup`] that runs tasks and collects their
//!   errors.
//!
//! # Example
//!
//! ```rust
//! use errkit::{ContextualError, Field, TaskResult, WaitGroup, with_stop_on_error};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let wg = WaitGroup::new([with_stop_on_error()]);
//!
//! wg.spawn(async {
//!     let err = ContextualError::new("import failed").with_field(Field::int("row", 12));
//!     TaskResult::Err(err.into())
//! })
//! .await;
//!
//! let errors = wg.wait().await.unwrap_err();
//! assert_eq!(errors.to_string(), "import failed");
//! # }
//! ```

pub use errkit_core::{
    BoxError, CancelContext, Canceled, Chain, ContextualError, ErrorFactory, ErrorObserver, Field,
    FieldFormat, FieldKind, FieldValue, MultiError, NoopObserver, SharedError, StacktraceDepth,
    TracingObserver, add_fields, cause, chain, errorf, errorf_with_fields, find,
    find_field_in_chain, get_chain_fields, get_error, get_field, get_fields, is, is_nil_field,
    take_stacktrace, wrapf,
};
pub use errkit_sync::{
    TaskError, TaskResult, WaitCounter, WaitGroup, WaitGroupConfig, WaitGroupOption,
    with_config, with_counter, with_name, with_observer, with_parent_context, with_stop_on_error,
    with_task_limit, with_task_runner,
};
