//! # Migrator Repository
//! This crate provides the store abstractions the migrator reads from and
//! writes to. It includes definitions for errors, the source and target
//! interfaces, and concrete implementations for SQLite (source) and
//! PostgreSQL (target).
pub mod errors;
pub mod interfaces;
pub mod postgres;
pub mod sqlite;
pub mod utils;

pub use errors::{SourceStoreError, TargetStoreError};
pub use interfaces::{InsertOutcome, SourceStore, TargetStore};
pub use postgres::PostgresTargetStore;
pub use sqlite::SqliteSourceStore;
