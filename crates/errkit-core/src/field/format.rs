//! Textual renderings of a field

use super::Field;
use std::fmt;

/// Rendering mode for a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldFormat {
    /// Quoted value only: `"v"`
    Quote,
    /// `[k: v]`
    Compact,
    /// `{Key: k, Value: v}`
    #[default]
    Struct,
    /// `{Key: k, Type: T, Value: v}`
    StructWithType,
    /// `{k: v}` with the value in its debug form
    Verbose,
}

/// Lazily formatted field, returned by [`Field::display`].
pub struct FieldDisplay<'a> {
    field: &'a Field,
    format: FieldFormat,
}

impl fmt::Display for FieldDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        let value = field.value();
        match self.format {
            FieldFormat::Quote => write!(f, "{:?}", value.to_string()),
            FieldFormat::Compact => write!(f, "[{}: {}]", field.key(), value),
            FieldFormat::Struct => write!(f, "{{Key: {}, Value: {}}}", field.key(), value),
            FieldFormat::StructWithType => write!(
                f,
                "{{Key: {}, Type: {}, Value: {}}}",
                field.key(),
                field.kind(),
                value
            ),
            FieldFormat::Verbose => write!(f, "{{{}: {:?}}}", field.key(), value),
        }
    }
}

impl Field {
    pub fn display(&self, format: FieldFormat) -> FieldDisplay<'_> {
        FieldDisplay {
            field: self,
            format,
        }
    }

    pub fn render(&self, format: FieldFormat) -> String {
        self.display(format).to_string()
    }
}

/// `{}` renders [`FieldFormat::Struct`], `{:#}` renders
/// [`FieldFormat::StructWithType`].
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = if f.alternate() {
            FieldFormat::StructWithType
        } else {
            FieldFormat::Struct
        };
        fmt::Display::fmt(&self.display(format), f)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("value", &self.value())
            .finish()
    }
}
