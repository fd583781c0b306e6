//! Error types for the bnchmrk library.
//!
//! Only input that cannot be read at all is an error. Malformed rows, bad
//! headers and data-quality problems are reported as check results instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sanity-check runs.
#[derive(Debug, Error)]
pub enum SanityError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but holds no bytes.
    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    /// The file has no header row.
    #[error("Missing header row in '{0}'")]
    MissingHeader(PathBuf),

    /// The file is not valid UTF-8.
    #[error("Encoding error in '{path}': invalid UTF-8 at byte {offset}")]
    Encoding { path: PathBuf, offset: usize },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Writing report artifacts failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type alias for sanity-check operations.
pub type Result<T> = std::result::Result<T, SanityError>;
