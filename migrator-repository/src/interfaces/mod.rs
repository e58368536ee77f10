//! This module defines and re-exports the store interfaces.
//! It serves as a central point for accessing traits related to reading the
//! source and writing the target.
mod source_store;
mod target_store;

pub use source_store::SourceStore;
pub use target_store::{InsertOutcome, TargetStore};
