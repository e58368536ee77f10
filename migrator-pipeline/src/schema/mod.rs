//! Schema descriptor loader.
//!
//! Reads the declarative model-definition document and produces typed field
//! and relationship metadata for every model block.
mod parser;
mod tokenizer;

use std::path::Path;

use migrator_shared::types::SchemaMap;
use tracing::info;

use crate::errors::SchemaError;

pub use parser::parse_schema;

/// Reads and parses the descriptor document at `path`.
///
/// A missing or unreadable file is fatal for the caller.
pub fn load_schema(path: impl AsRef<Path>) -> Result<SchemaMap, SchemaError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let models = parse_schema(&text)?;
    info!(path = %path.display(), model_count = models.len(), "Loaded schema descriptor");
    Ok(models)
}
