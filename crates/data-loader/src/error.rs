//! Error types for the data-loader crate.
//!
//! Every variant here is fatal to startup: a process that cannot load a
//! consistent catalog and similarity matrix must not serve lookups from
//! partial data.

use crate::types::MovieId;
use thiserror::Error;

/// Errors that can occur while loading and validating the artifacts
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Artifact could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading an artifact
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Artifact is not well-formed JSON or has the wrong shape
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A required catalog column is absent
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Catalog columns disagree on their length
    #[error("Column '{column}' has {found} rows but expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field} at row {row}: {value}")]
    InvalidValue {
        field: String,
        row: usize,
        value: String,
    },

    /// Similarity matrix shape doesn't match the catalog
    #[error("Dimension mismatch: {reason} (expected {expected}, found {found})")]
    DimensionMismatch {
        reason: String,
        expected: usize,
        found: usize,
    },

    /// Two catalog entries share the same id
    #[error("Duplicate movie id {id} at rows {first} and {second}")]
    DuplicateId {
        id: MovieId,
        first: usize,
        second: usize,
    },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
