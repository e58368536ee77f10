use thiserror::Error;

/// Represents errors that can occur while reading from the source store.
///
/// Any of these is fatal for the run that raised it: the source is the
/// authority the migration copies from.
#[derive(Debug, Error)]
pub enum SourceStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unsupported value in {table}.{column}: {reason}")]
    UnsupportedValue {
        table: String,
        column: String,
        reason: String,
    },
}
