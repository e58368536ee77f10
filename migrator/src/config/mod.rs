//! Configuration module for the migrator.
//! Defines environment-driven settings and the store dependencies built from them.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{ConfigError, MigratorConfig};
