use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::FieldDescriptor;

/// Model name to descriptor, iterated in name order.
pub type SchemaMap = BTreeMap<String, ModelDescriptor>;

/// A model parsed from the schema descriptor document.
///
/// `dependencies` holds the names of other models this model references
/// through a foreign key. It is derived from relation lines, never authored
/// directly, and never contains the model itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    /// Physical table name; equals `name` unless remapped with `@@map`.
    pub table: String,
    pub fields: Vec<FieldDescriptor>,
    pub dependencies: BTreeSet<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            fields: Vec::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_dependency(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if model != self.name {
            self.dependencies.insert(model);
        }
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Returns the field declared with `@id`, falling back to a field named `id`.
    pub fn identity_field(&self) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.is_identity)
            .or_else(|| self.fields.iter().find(|f| f.name == "id"))
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.column == column)
    }
}
