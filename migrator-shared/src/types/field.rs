use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical column type a migrated value is converted to.
///
/// The declared type is independent of what the source driver returns: a
/// `Boolean` field may arrive as `1`, `"true"` or `"0"` and is still written
/// to the target as a real boolean.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
}

impl FieldType {
    /// Maps a scalar keyword of the schema descriptor grammar to its canonical type.
    ///
    /// Returns `None` for keywords the migrator does not handle (`Json`,
    /// `Bytes`, enum names, related models...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "String" => Some(FieldType::Text),
            "Int" | "BigInt" => Some(FieldType::Integer),
            "Float" | "Decimal" => Some(FieldType::Real),
            "Boolean" => Some(FieldType::Boolean),
            "DateTime" => Some(FieldType::Timestamp),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Real)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "Text",
            FieldType::Integer => "Integer",
            FieldType::Real => "Real",
            FieldType::Boolean => "Boolean",
            FieldType::Timestamp => "Timestamp",
        };
        f.write_str(name)
    }
}

/// A scalar field declared on a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub is_optional: bool,
    /// Set by an `@id` directive.
    pub is_identity: bool,
    /// Physical column name; equals `name` unless remapped with `@map`.
    pub column: String,
}

impl FieldDescriptor {
    /// Creates a required, non-identity field whose column matches its name.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            field_type,
            is_optional: false,
            is_identity: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn mapped_to(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }
}
