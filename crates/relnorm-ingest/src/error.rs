//! Error types for schema ingestion.

use std::path::PathBuf;

use relnorm_model::SchemaError;
use thiserror::Error;

/// Errors that can occur while reading or writing schema files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Schema Text Errors ===
    /// A line of the schema text does not follow the syntax.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A dependency declaration outside a schema file is malformed.
    #[error("invalid dependency '{text}': {message}")]
    Dependency { text: String, message: String },

    /// The schema text holds no relation block.
    #[error("schema contains no relations")]
    EmptySchema,

    // === Sample Errors ===
    /// Failed to parse a CSV sample file.
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// An attribute has no column in the sample file.
    #[error("column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// The parsed schema breaks a structural rule.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
