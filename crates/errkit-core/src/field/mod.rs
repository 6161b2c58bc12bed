//! Typed context fields attached to errors
//!
//! A [`Field`] is a fixed-shape container: a key, a [`FieldKind`] and three
//! payload slots (integer, string, opaque). The kind decides which slot is
//! active, and [`Field::value`] resolves it into a [`FieldValue`].

mod format;
mod kind;
mod value;

#[cfg(test)]
mod tests;

pub use format::{FieldDisplay, FieldFormat};
pub use kind::FieldKind;
pub use value::{FieldValue, Reflect};

use crate::context::CancelContext;
use crate::stacktrace::{StacktraceDepth, take_stacktrace};
use crate::SharedError;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

/// Payload stored in the opaque slot
#[derive(Clone)]
enum Opaque {
    Bytes(Arc<[u8]>),
    Offset(FixedOffset),
    Time(DateTime<FixedOffset>),
    Error(SharedError),
    Context(CancelContext),
    Value(Arc<dyn Reflect>),
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Offset(a), Self::Offset(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => Arc::ptr_eq(a, b),
            (Self::Context(a), Self::Context(b)) => a.same_as(b),
            (Self::Value(a), Self::Value(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A named piece of context carried by an error.
///
/// Fields are immutable once built; construct them with the typed
/// constructors (`Field::string`, `Field::int64`, ...) or with [`Field::any`].
#[derive(Clone, Default, PartialEq)]
pub struct Field {
    key: String,
    kind: FieldKind,
    integer: i64,
    string: String,
    opaque: Option<Opaque>,
}

impl Field {
    fn with_kind(key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            kind,
            ..Self::default()
        }
    }

    fn with_opaque(key: impl Into<String>, kind: FieldKind, opaque: Opaque) -> Self {
        Self {
            opaque: Some(opaque),
            ..Self::with_kind(key, kind)
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            string: value.into(),
            ..Self::with_kind(key, FieldKind::String)
        }
    }

    pub fn int(key: impl Into<String>, value: isize) -> Self {
        Self::int64(key, value as i64)
    }

    pub fn int64(key: impl Into<String>, value: i64) -> Self {
        Self {
            integer: value,
            ..Self::with_kind(key, FieldKind::Int64)
        }
    }

    /// The float is stored bit-for-bit in the integer slot.
    pub fn float64(key: impl Into<String>, value: f64) -> Self {
        Self {
            integer: value.to_bits() as i64,
            ..Self::with_kind(key, FieldKind::Float64)
        }
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self {
            integer: i64::from(value),
            ..Self::with_kind(key, FieldKind::Bool)
        }
    }

    /// Opaque binary blob. For UTF-8 text use [`Field::byte_string`].
    pub fn binary(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::with_opaque(key, FieldKind::Binary, Opaque::Bytes(value.into().into()))
    }

    /// UTF-8 encoded text carried as bytes.
    pub fn byte_string(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self::with_opaque(key, FieldKind::ByteString, Opaque::Bytes(value.into().into()))
    }

    /// Stored as nanoseconds, saturating at `i64::MAX`.
    pub fn duration(key: impl Into<String>, value: Duration) -> Self {
        Self {
            integer: i64::try_from(value.as_nanos()).unwrap_or(i64::MAX),
            ..Self::with_kind(key, FieldKind::Duration)
        }
    }

    /// Timestamps that fit in `i64` Unix nanoseconds are stored compactly
    /// (nanoseconds plus offset); anything else is kept whole as `TimeFull`.
    pub fn time<Tz: TimeZone>(key: impl Into<String>, value: DateTime<Tz>) -> Self {
        let value = value.fixed_offset();
        match value.timestamp_nanos_opt() {
            Some(nanos) => Self {
                integer: nanos,
                opaque: Some(Opaque::Offset(*value.offset())),
                ..Self::with_kind(key, FieldKind::Time)
            },
            None => Self::with_opaque(key, FieldKind::TimeFull, Opaque::Time(value)),
        }
    }

    pub fn named_error(key: impl Into<String>, err: SharedError) -> Self {
        Self::with_opaque(key, FieldKind::Error, Opaque::Error(err))
    }

    /// Shorthand for `Field::named_error("error", err)`.
    pub fn error(err: SharedError) -> Self {
        Self::named_error("error", err)
    }

    pub fn named_context(key: impl Into<String>, ctx: CancelContext) -> Self {
        Self::with_opaque(key, FieldKind::Context, Opaque::Context(ctx))
    }

    /// Shorthand for `Field::named_context("ctx", ctx)`.
    pub fn context(ctx: CancelContext) -> Self {
        Self::named_context("ctx", ctx)
    }

    /// Arbitrary value, rendered through its `Debug` form.
    pub fn reflect<T: Reflect>(key: impl Into<String>, value: T) -> Self {
        Self::with_opaque(key, FieldKind::Reflect, Opaque::Value(Arc::new(value)))
    }

    /// The nil field: a reflected field without payload.
    ///
    /// Lookups that find nothing return this sentinel; detect it with
    /// [`Field::is_nil`].
    pub fn nil(key: impl Into<String>) -> Self {
        Self::with_kind(key, FieldKind::Reflect)
    }

    /// Build a field from a value whose type is only known at runtime.
    ///
    /// Known payload types are routed to their typed constructor, `()` yields
    /// the nil field, and everything else becomes a reflected field.
    pub fn any<T: Reflect>(key: impl Into<String>, value: T) -> Self {
        let key = key.into();
        let dynamic: &dyn Any = &value;

        if dynamic.is::<()>() {
            return Self::nil(key);
        }
        if let Some(v) = dynamic.downcast_ref::<String>() {
            return Self::string(key, v.clone());
        }
        if let Some(v) = dynamic.downcast_ref::<&'static str>() {
            return Self::string(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<isize>() {
            return Self::int(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<i32>() {
            return Self::int64(key, i64::from(*v));
        }
        if let Some(v) = dynamic.downcast_ref::<i64>() {
            return Self::int64(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<f64>() {
            return Self::float64(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<Vec<u8>>() {
            return Self::binary(key, v.clone());
        }
        if let Some(v) = dynamic.downcast_ref::<bool>() {
            return Self::bool(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<DateTime<Utc>>() {
            return Self::time(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<DateTime<FixedOffset>>() {
            return Self::time(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<Duration>() {
            return Self::duration(key, *v);
        }
        if let Some(v) = dynamic.downcast_ref::<SharedError>() {
            return Self::named_error(key, v.clone());
        }
        if let Some(v) = dynamic.downcast_ref::<CancelContext>() {
            return Self::named_context(key, v.clone());
        }

        Self::reflect(key, value)
    }

    /// String field holding the full stack trace of the caller.
    pub fn stack(key: impl Into<String>) -> Self {
        Self::stack_skip_depth(key, 1, StacktraceDepth::Full)
    }

    /// Like [`Field::stack`], capturing at most `depth` frames.
    pub fn stack_depth(key: impl Into<String>, depth: usize) -> Self {
        Self::stack_skip_depth(key, 1, StacktraceDepth::Frames(depth))
    }

    /// Like [`Field::stack`], skipping `skip` extra frames from the top.
    pub fn stack_skip(key: impl Into<String>, skip: usize) -> Self {
        Self::stack_skip_depth(key, skip + 1, StacktraceDepth::Full)
    }

    pub fn stack_skip_depth(key: impl Into<String>, skip: usize, depth: StacktraceDepth) -> Self {
        Self::string(key, take_stacktrace(skip + 1, depth))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_kind(&self, kind: FieldKind) -> bool {
        self.kind == kind
    }

    /// True for the nil field sentinel: reflected kind with no payload.
    pub fn is_nil(&self) -> bool {
        self.kind == FieldKind::Reflect && self.opaque.is_none()
    }

    /// Resolve the active payload for this field's kind.
    ///
    /// Never panics: unknown kinds, or a kind whose slot is not populated,
    /// fall back to whatever the opaque slot holds.
    pub fn value(&self) -> FieldValue<'_> {
        match (self.kind, &self.opaque) {
            (FieldKind::String, _) => FieldValue::Str(&self.string),
            (FieldKind::Int64, _) => FieldValue::Int64(self.integer),
            (FieldKind::Float64, _) => FieldValue::Float64(f64::from_bits(self.integer as u64)),
            (FieldKind::Bool, _) => FieldValue::Bool(self.integer == 1),
            (FieldKind::Duration, _) => {
                FieldValue::Duration(Duration::from_nanos(self.integer.max(0) as u64))
            }
            (FieldKind::Time, Some(Opaque::Offset(offset))) => {
                FieldValue::Time(offset.timestamp_nanos(self.integer))
            }
            (FieldKind::ByteString, Some(Opaque::Bytes(bytes))) => FieldValue::ByteString(bytes),
            _ => self.opaque_value(),
        }
    }

    fn opaque_value(&self) -> FieldValue<'_> {
        match &self.opaque {
            None => FieldValue::Nil,
            Some(Opaque::Bytes(bytes)) => FieldValue::Binary(bytes),
            Some(Opaque::Offset(offset)) => FieldValue::Offset(*offset),
            Some(Opaque::Time(time)) => FieldValue::Time(*time),
            Some(Opaque::Error(err)) => FieldValue::Error(err.as_ref()),
            Some(Opaque::Context(ctx)) => FieldValue::Context(ctx),
            Some(Opaque::Value(value)) => FieldValue::Reflect(value.as_ref()),
        }
    }
}

/// Free-function form of [`Field::is_nil`].
pub fn is_nil_field(field: &Field) -> bool {
    field.is_nil()
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Field", 3)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("type", &self.kind)?;
        state.serialize_field("value", &self.value())?;
        state.end()
    }
}
