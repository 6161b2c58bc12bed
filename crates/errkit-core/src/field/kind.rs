//! Field kind discriminator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type carried by a [`Field`](super::Field).
///
/// The kind decides which payload slot of the field is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldKind {
    /// The data type is unknown (zero field)
    #[default]
    Unknown,
    /// Arbitrary value rendered through its `Debug` form
    Reflect,
    /// UTF-8 string
    String,
    /// Signed 64-bit integer
    Int64,
    /// 64-bit float, stored bit-exact in the integer slot
    Float64,
    /// Opaque binary blob
    Binary,
    /// Boolean, stored as 0/1 in the integer slot
    Bool,
    /// UTF-8 text carried as bytes
    ByteString,
    /// Timestamp stored as Unix nanoseconds plus UTC offset
    Time,
    /// Timestamp outside the nanosecond range, stored whole
    TimeFull,
    /// Duration stored as nanoseconds
    Duration,
    /// Nested error
    Error,
    /// Nested cancellation context
    Context,
}

impl FieldKind {
    /// Name used by the struct-with-type rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Reflect => "Reflect",
            Self::String => "String",
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::Binary => "Binary",
            Self::Bool => "Bool",
            Self::ByteString => "ByteString",
            Self::Time => "Time",
            Self::TimeFull => "TimeFull",
            Self::Duration => "Duration",
            Self::Error => "Error",
            Self::Context => "Context",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
