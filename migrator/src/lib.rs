//! Store Migrator Library
//!
//! This library provides the application layer of the migrator: environment
//! configuration, dependency wiring, logging setup and report artifacts
//! shared by the `migrate` and `verify` binaries.

pub mod config;
pub mod errors;
pub mod report;
pub mod telemetry;

pub use config::{ConfigError, Dependencies, MigratorConfig};
pub use errors::MigratorError;
