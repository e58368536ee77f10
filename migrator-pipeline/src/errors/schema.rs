//! Error types for the schema descriptor loader.
//! Defines the ways a descriptor document can fail to load or parse.
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur while loading the schema descriptor.
///
/// Reading failures are fatal for the run. Structural errors report the
/// 1-based line where the problem was detected.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Error reading schema {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unexpected closing brace at line {line}")]
    UnexpectedCloseBrace { line: usize },
    #[error("Block {name} opened at line {line} is never closed")]
    UnterminatedBlock { name: String, line: usize },
    #[error("Model {name} declared at line {line} is not followed by a block")]
    MissingOpenBrace { name: String, line: usize },
    #[error("Model block without a name at line {line}")]
    MissingBlockName { line: usize },
    #[error("Model {name} declared again at line {line}")]
    DuplicateModel { name: String, line: usize },
}
