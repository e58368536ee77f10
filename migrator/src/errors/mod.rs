//! Error types for the migrator binaries.
//! Consolidates the fatal errors of every stage so `main` can propagate them with `?`.
use std::path::PathBuf;

use migrator_pipeline::errors::{ExecutorError, SchemaError, VerifierError};
use migrator_repository::{SourceStoreError, TargetStoreError};

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum MigratorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Source store error: {0}")]
    Source(#[from] SourceStoreError),
    #[error("Target store error: {0}")]
    Target(#[from] TargetStoreError),
    #[error("Migration error: {0}")]
    Executor(#[from] ExecutorError),
    #[error("Verification error: {0}")]
    Verifier(#[from] VerifierError),
    #[error("Error writing report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
