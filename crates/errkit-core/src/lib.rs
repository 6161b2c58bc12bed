//! Errkit Core Library
//!
//! This crate provides the error building blocks of errkit: typed context
//! fields, contextual errors that wrap a cause, chain walking helpers,
//! multi-error aggregation and a cancellation context.
//!
//! # Example
//!
//! ```rust
//! use errkit_core::{ContextualError, Field, FieldFormat, find_field_in_chain};
//!
//! let err = ContextualError::wrap(std::io::Error::other("connection reset"), "fetch user")
//!     .with_field(Field::int64("user_id", 42));
//!
//! assert_eq!(err.to_string(), "fetch user: connection reset");
//! assert_eq!(
//!     err.render(FieldFormat::Compact),
//!     "fetch user: connection reset: [[user_id: 42]]"
//! );
//! assert_eq!(find_field_in_chain(&err, "user_id").value().as_i64(), Some(42));
//! ```

pub mod chain;
pub mod context;
pub mod error;
pub mod field;
pub mod multi;
pub mod observer;
pub mod stacktrace;

use std::error::Error as StdError;
use std::sync::Arc;

/// Shared, clonable error handle
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Owned boxed error
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// Re-export commonly used types
pub use chain::{Chain, cause, chain, find, is};
pub use context::{CancelContext, Canceled};
pub use error::{
    ContextualError, add_fields, find_field_in_chain, get_chain_fields, get_error, get_field,
    get_fields,
};
pub use field::{Field, FieldDisplay, FieldFormat, FieldKind, FieldValue, Reflect, is_nil_field};
pub use multi::MultiError;
pub use observer::{ErrorFactory, ErrorObserver, NoopObserver, TracingObserver};
pub use stacktrace::{StacktraceDepth, take_stacktrace};
