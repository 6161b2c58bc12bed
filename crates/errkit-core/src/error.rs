//! Errors carrying a message, an optional cause and structured fields

use crate::chain::{chain, find};
use crate::field::{Field, FieldFormat};
use crate::{BoxError, SharedError};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// An error with a message, an optional cause and ordered context fields.
///
/// `Display` renders the message chain (`message: cause`); use
/// [`ContextualError::render`] or `{:#}` to include the fields.
#[derive(Clone)]
pub struct ContextualError {
    message: String,
    cause: Option<SharedError>,
    fields: Vec<Field>,
}

impl ContextualError {
    /// A leaf error with no cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_cause(None, message)
    }

    pub fn wrap<E>(cause: E, message: impl Into<String>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::wrap_shared(Arc::new(cause), message)
    }

    pub fn wrap_shared(cause: SharedError, message: impl Into<String>) -> Self {
        Self::with_cause(Some(cause), message)
    }

    /// Wrap an optional cause; `None` builds a leaf.
    pub fn with_cause(cause: Option<SharedError>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause,
            fields: Vec::new(),
        }
    }

    /// A node that takes its message from `cause`, rendered `msg: msg`.
    fn adopt(cause: SharedError) -> Self {
        let message = cause.to_string();
        Self::wrap_shared(cause, message)
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&SharedError> {
        self.cause.as_ref()
    }

    /// This node's own fields, in attachment order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First own field with `key`, or the nil field.
    pub fn field(&self, key: &str) -> Field {
        self.fields
            .iter()
            .find(|field| field.key() == key)
            .cloned()
            .unwrap_or_else(|| Field::nil(key))
    }

    /// The first contextual node in the chain of `err`.
    pub fn find_in<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ContextualError> {
        find::<ContextualError>(err)
    }

    /// Message chain followed by the fields in `format`:
    /// `message: [f1 f2 ...]`, or just the message chain without fields.
    pub fn render(&self, format: FieldFormat) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_chain(&mut out);
        if !self.fields.is_empty() {
            let fields: Vec<String> = self.fields.iter().map(|f| f.render(format)).collect();
            out.push_str(": [");
            out.push_str(&fields.join(" "));
            out.push(']');
        }
        out
    }

    fn write_chain(&self, out: &mut impl fmt::Write) -> fmt::Result {
        out.write_str(&self.message)?;
        match &self.cause {
            Some(cause) => write!(out, ": {}", cause),
            None => Ok(()),
        }
    }
}

impl fmt::Display for ContextualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str(&self.render(FieldFormat::StructWithType))
        } else {
            self.write_chain(f)
        }
    }
}

impl fmt::Debug for ContextualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextualError")
            .field("message", &self.message)
            .field("fields", &self.fields)
            .field("cause", &self.cause)
            .finish()
    }
}

impl StdError for ContextualError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn StdError + 'static))
    }
}

/// Coerce any error into a contextual one.
///
/// A contextual error is returned as is; one found deeper in the chain is
/// cloned; anything else becomes the cause of a new node with the same
/// message, so it renders as `boom: boom`.
pub fn get_error(err: BoxError) -> ContextualError {
    let err = match err.downcast::<ContextualError>() {
        Ok(contextual) => return *contextual,
        Err(err) => err,
    };
    if let Some(found) = ContextualError::find_in(err.as_ref()) {
        return found.clone();
    }
    ContextualError::adopt(Arc::from(err))
}

/// Attach fields to an error.
///
/// A top-level contextual error is extended in place. Any other error is
/// wrapped in a new contextual node that keeps the whole original chain.
pub fn add_fields(err: BoxError, fields: impl IntoIterator<Item = Field>) -> ContextualError {
    match err.downcast::<ContextualError>() {
        Ok(mut contextual) => {
            contextual.fields.extend(fields);
            *contextual
        }
        Err(err) => ContextualError::adopt(Arc::from(err)).with_fields(fields),
    }
}

/// Own fields of the first contextual node in the chain.
pub fn get_fields<'a>(err: &'a (dyn StdError + 'static)) -> &'a [Field] {
    ContextualError::find_in(err)
        .map(ContextualError::fields)
        .unwrap_or_default()
}

/// First own field with `key` of the first contextual node, or the nil field.
pub fn get_field(err: &(dyn StdError + 'static), key: &str) -> Field {
    match ContextualError::find_in(err) {
        Some(contextual) => contextual.field(key),
        None => Field::nil(key),
    }
}

fn contextual_nodes<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a ContextualError> {
    chain(err).filter_map(|node| node.downcast_ref::<ContextualError>())
}

/// Fields of every contextual node in the chain, outermost node first.
pub fn get_chain_fields(err: &(dyn StdError + 'static)) -> Vec<Field> {
    contextual_nodes(err)
        .flat_map(|contextual| contextual.fields.iter().cloned())
        .collect()
}

/// First field with `key` walking the chain outer to inner, or the nil field.
pub fn find_field_in_chain(err: &(dyn StdError + 'static), key: &str) -> Field {
    contextual_nodes(err)
        .flat_map(|contextual| contextual.fields.iter())
        .find(|field| field.key() == key)
        .cloned()
        .unwrap_or_else(|| Field::nil(key))
}

/// `errorf!("fmt", args...)`: a leaf [`ContextualError`] with a formatted message.
#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::ContextualError::new(::std::format!($($arg)+))
    };
}

/// `wrapf!(cause, "fmt", args...)`: wrap `cause` with a formatted message.
#[macro_export]
macro_rules! wrapf {
    ($cause:expr, $($arg:tt)+) => {
        $crate::ContextualError::wrap($cause, ::std::format!($($arg)+))
    };
}

/// `errorf_with_fields!([fields...], "fmt", args...)`
#[macro_export]
macro_rules! errorf_with_fields {
    ([$($field:expr),* $(,)?], $($arg:tt)+) => {
        $crate::ContextualError::new(::std::format!($($arg)+)).with_fields([$($field),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn boxed(err: impl StdError + Send + Sync + 'static) -> BoxError {
        Box::new(err)
    }

    #[test]
    fn test_message_chain() {
        let err = ContextualError::wrap(ContextualError::new("inner"), "outer");
        assert_eq!(err.to_string(), "outer: inner");
        assert_eq!(ContextualError::with_cause(None, "leaf").to_string(), "leaf");
    }

    #[test]
    fn test_render_with_fields() {
        let err = ContextualError::new("request failed")
            .with_field(Field::string("path", "/api"))
            .with_field(Field::int("status", 502));

        assert_eq!(
            err.render(FieldFormat::Struct),
            "request failed: [{Key: path, Value: /api} {Key: status, Value: 502}]"
        );
        assert_eq!(
            err.render(FieldFormat::Compact),
            "request failed: [[path: /api] [status: 502]]"
        );
        assert_eq!(
            format!("{:#}", err),
            "request failed: [{Key: path, Type: String, Value: /api} \
             {Key: status, Type: Int64, Value: 502}]"
        );
    }

    #[test]
    fn test_render_without_fields_is_message() {
        let err = ContextualError::wrap(io::Error::other("eof"), "read");
        assert_eq!(err.render(FieldFormat::Struct), "read: eof");
    }

    #[test]
    fn test_macros() {
        let err = errorf!("retry {} of {}", 2, 3);
        assert_eq!(err.to_string(), "retry 2 of 3");

        let err = wrapf!(io::Error::other("timeout"), "dial {}", "db");
        assert_eq!(err.to_string(), "dial db: timeout");

        let err = errorf_with_fields!([Field::bool("fatal", true)], "crash in {}", "worker");
        assert_eq!(err.message(), "crash in worker");
        assert_eq!(err.fields().len(), 1);
    }

    #[test]
    fn test_get_error_returns_contextual() {
        let original = ContextualError::new("kept").with_field(Field::int64("n", 1));
        let got = get_error(boxed(original));
        assert_eq!(got.message(), "kept");
        assert_eq!(got.fields().len(), 1);
    }

    #[test]
    fn test_get_error_finds_nested_contextual() {
        #[derive(Debug, thiserror::Error)]
        #[error("foreign wrapper")]
        struct Wrapper(#[source] ContextualError);

        let inner = ContextualError::new("inner").with_field(Field::string("k", "v"));
        let got = get_error(boxed(Wrapper(inner)));
        assert_eq!(got.message(), "inner");
        assert_eq!(got.field("k").value().as_str(), Some("v"));
    }

    #[test]
    fn test_get_error_adopts_foreign() {
        let got = get_error(boxed(io::Error::other("boom")));
        assert_eq!(got.message(), "boom");
        assert_eq!(got.to_string(), "boom: boom");
        assert_eq!(got.cause().map(|c| c.to_string()).as_deref(), Some("boom"));
        assert!(got.fields().is_empty());
        assert!(find::<io::Error>(&got).is_some());
    }

    #[test]
    fn test_add_fields_extends_contextual() {
        let err = ContextualError::new("base").with_field(Field::int("a", 1));
        let err = add_fields(boxed(err), [Field::int("b", 2)]);
        let keys: Vec<&str> = err.fields().iter().map(|f| f.key()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_add_fields_adopts_foreign() {
        let err = add_fields(boxed(io::Error::other("refused")), [Field::string("host", "db")]);
        assert_eq!(err.to_string(), "refused: refused");
        assert_eq!(
            err.render(FieldFormat::Compact),
            "refused: refused: [[host: db]]"
        );
        assert_eq!(
            find::<io::Error>(&err).map(|e| e.to_string()).as_deref(),
            Some("refused")
        );
    }

    #[test]
    fn test_field_lookup_on_single_error() {
        let err = ContextualError::new("m")
            .with_field(Field::string("dup", "first"))
            .with_field(Field::string("dup", "second"));
        assert_eq!(get_field(&err, "dup").value().as_str(), Some("first"));
        assert!(get_field(&err, "missing").is_nil());
        assert_eq!(get_fields(&err).len(), 2);
        assert!(get_fields(&io::Error::other("x")).is_empty());
    }

    #[test]
    fn test_chain_fields_skip_foreign_nodes() {
        let err = ContextualError::wrap(
            ContextualError::wrap(io::Error::other("io"), "mid").with_field(Field::int("mid", 2)),
            "top",
        )
        .with_field(Field::int("top", 1));

        let keys: Vec<String> = get_chain_fields(&err)
            .iter()
            .map(|f| f.key().to_string())
            .collect();
        assert_eq!(keys, vec!["top", "mid"]);
        assert!(find_field_in_chain(&err, "nope").is_nil());
    }
}
