//! Borrowed view over the active payload of a field

use crate::context::CancelContext;
use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// Values that can be carried by a reflected field.
///
/// Blanket-implemented for every `Debug + Send + Sync + 'static` type, so any
/// such value can be attached and later downcast back to its concrete type.
pub trait Reflect: Any + fmt::Debug + Send + Sync {
    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> Reflect for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Value of a field, resolved from its kind.
///
/// `Display` yields the plain rendering used by every field format;
/// `Debug` yields the verbose form (strings quoted).
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    /// No payload
    Nil,
    Str(&'a str),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Binary(&'a [u8]),
    ByteString(&'a [u8]),
    Duration(Duration),
    Time(DateTime<FixedOffset>),
    /// A bare UTC offset left in the opaque slot
    Offset(FixedOffset),
    Error(&'a (dyn StdError + Send + Sync + 'static)),
    Context(&'a CancelContext),
    Reflect(&'a dyn Reflect),
}

impl<'a> FieldValue<'a> {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::Str(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Self::Binary(b) | Self::ByteString(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&'a (dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Error(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&'a CancelContext> {
        match self {
            Self::Context(ctx) => Some(*ctx),
            _ => None,
        }
    }

    /// Downcast a reflected value to its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match self {
            Self::Reflect(value) => (*value).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("[")?;
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", byte)?;
    }
    f.write_str("]")
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("<nil>"),
            Self::Str(s) => f.write_str(s),
            Self::Int64(n) => write!(f, "{}", n),
            Self::Float64(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Binary(bytes) => write_bytes(f, bytes),
            Self::ByteString(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Self::Duration(d) => write!(f, "{:?}", d),
            Self::Time(t) => write!(f, "{}", t),
            Self::Offset(offset) => write!(f, "{}", offset),
            Self::Error(err) => write!(f, "{}", err),
            Self::Context(ctx) => write!(f, "{:?}", ctx),
            Self::Reflect(value) => write!(f, "{:?}", value),
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("<nil>"),
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Int64(n) => write!(f, "{:?}", n),
            Self::Float64(n) => write!(f, "{:?}", n),
            Self::Bool(b) => write!(f, "{:?}", b),
            Self::Binary(bytes) => write!(f, "{:?}", bytes),
            Self::ByteString(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            Self::Duration(d) => write!(f, "{:?}", d),
            Self::Time(t) => write!(f, "{:?}", t),
            Self::Offset(offset) => write!(f, "{:?}", offset),
            Self::Error(err) => write!(f, "{:?}", err),
            Self::Context(ctx) => write!(f, "{:?}", ctx),
            Self::Reflect(value) => write!(f, "{:?}", value),
        }
    }
}

impl Serialize for FieldValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_none(),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int64(n) => serializer.serialize_i64(*n),
            Self::Float64(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Binary(bytes) => bytes.serialize(serializer),
            Self::ByteString(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            Self::Time(t) => serializer.serialize_str(&t.to_rfc3339()),
            _ => serializer.collect_str(self),
        }
    }
}
