//! # Migrator Pipeline
//! This crate implements the migration engine: it parses the schema
//! descriptor, converts source values to their declared types, orders models
//! by their foreign-key dependencies, copies every row into the target, and
//! independently verifies the result.
pub mod convert;
pub mod errors;
pub mod executor;
pub mod resolver;
pub mod schema;
pub mod verifier;

pub use executor::{InsertionStrategy, MigrationExecutor, DEFAULT_BATCH_SIZE};
pub use resolver::DependencyGraph;
pub use verifier::{VerificationEngine, VerifierConfig};
