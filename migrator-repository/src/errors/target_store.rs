use thiserror::Error;

/// Represents errors that can occur while writing to or reading from the target store.
#[derive(Debug, Error)]
pub enum TargetStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Column count {columns} does not match value count {values}")]
    ArityMismatch { columns: usize, values: usize },
}
