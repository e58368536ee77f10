//! SQLite module - the source store the migrator reads from.
mod source_store;

pub use source_store::SqliteSourceStore;
