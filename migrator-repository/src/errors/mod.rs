//! Error types for the migrator stores.
//! Consolidates and re-exports the errors raised by source and target store operations.
mod source_store;
mod target_store;

pub use source_store::SourceStoreError;
pub use target_store::TargetStoreError;
