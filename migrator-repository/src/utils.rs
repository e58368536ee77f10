//! Utility functions shared by the store implementations.

/// Quote a table or column name for interpolation into SQL.
///
/// Both SQLite and PostgreSQL accept double-quoted identifiers with embedded
/// quotes doubled. Table and column names cannot be bound as parameters, so
/// every name that reaches a query string goes through here.
///
/// # Arguments
///
/// * `name` - The raw identifier
///
/// # Returns
///
/// * `Some(String)` - The quoted identifier
/// * `None` - If the name is empty or contains a NUL byte
///
/// # Example
///
/// ```
/// use migrator_repository::utils::quote_identifier;
///
/// assert_eq!(quote_identifier("Member").as_deref(), Some("\"Member\""));
/// ```
pub fn quote_identifier(name: &str) -> Option<String> {
    if name.is_empty() || name.contains('\0') {
        return None;
    }
    Some(format!("\"{}\"", name.replace('"', "\"\"")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("User").as_deref(), Some("\"User\""));
        assert_eq!(quote_identifier("joined_at").as_deref(), Some("\"joined_at\""));
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(
            quote_identifier("we\"ird").as_deref(),
            Some("\"we\"\"ird\"")
        );
    }

    #[test]
    fn test_quote_identifier_rejects_invalid() {
        assert!(quote_identifier("").is_none());
        assert!(quote_identifier("a\0b").is_none());
    }
}
