//! Generation error types.

use crate::db::RepositoryError;
use thiserror::Error;

/// Errors from the generation client and the exercise pipeline.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured: set LEXICON_API_KEY")]
    NoCredential,

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("generation service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response from generation service: {0}")]
    InvalidResponse(String),

    #[error("failed to encode generation request: {0}")]
    Decoding(String),

    #[error("generation cancelled")]
    Cancelled,

    #[error("failed to store generated exercises: {0}")]
    Storage(#[from] RepositoryError),
}

impl GenerationError {
    /// Transient failures that a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => matches!(status, 408 | 429) || (500..=599).contains(status),
            _ => false,
        }
    }
}
