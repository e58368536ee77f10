use std::collections::HashMap;

use crate::types::RawValue;

/// One row read from the source, in physical column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    pub columns: Vec<(String, RawValue)>,
}

impl SourceRow {
    pub fn new(columns: Vec<(String, RawValue)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

/// A target row whose columns were read in their textual form.
///
/// `None` is SQL NULL.
pub type TextRow = HashMap<String, Option<String>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_column() {
        let row = SourceRow::new(vec![
            ("id".to_string(), RawValue::from("u1")),
            ("active".to_string(), RawValue::Integer(1)),
        ]);
        assert_eq!(row.get("active"), Some(&RawValue::Integer(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.column_names().collect::<Vec<_>>(), vec!["id", "active"]);
    }
}
