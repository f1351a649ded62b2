//! Error types for lexicon-core.

use thiserror::Error;

/// Result type alias using ImportError.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that abort a CSV import.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("the CSV file is empty: a header and at least one data row are required")]
    EmptyFile,

    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

/// Errors decoding a generation response.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response does not match the exercise schema: {0}")]
    Schema(#[from] serde_json::Error),
}
