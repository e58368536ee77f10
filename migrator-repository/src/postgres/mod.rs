//! PostgreSQL module - the target store the migrator writes to.
mod target_store;

pub use target_store::PostgresTargetStore;
