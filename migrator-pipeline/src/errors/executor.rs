//! Error types for the migration executor.
//! Only run-level failures surface here; per-row failures are recorded on the
//! model's result instead.
use migrator_repository::{SourceStoreError, TargetStoreError};
use thiserror::Error;

/// Represents errors that abort a migration run.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Source store error: {0}")]
    Source(#[from] SourceStoreError),
    #[error("Target store error: {0}")]
    Target(#[from] TargetStoreError),
}
