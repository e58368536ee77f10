//! Error types for the verification engine.
use migrator_repository::{SourceStoreError, TargetStoreError};
use thiserror::Error;

/// Represents errors that abort a verification run.
///
/// Individual check failures are never errors; they are recorded in the report.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("Source store error: {0}")]
    Source(#[from] SourceStoreError),
    #[error("Target store error: {0}")]
    Target(#[from] TargetStoreError),
    #[error("Invalid structured-text field pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
