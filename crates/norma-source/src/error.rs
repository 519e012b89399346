//! Source API error types.

use thiserror::Error;

use crate::retry::Retryable;

/// Errors that can occur talking to the legal norm source API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level failure — no HTTP response was produced.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Source API returned a non-success HTTP status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response's embedded `status` field was present but not "200"
    ///.
    #[error("source integrity mismatch: status code {code}")]
    IntegrityMismatch { code: String },

    /// A discover/index/bloque response didn't match the expected shape.
    #[error("failed to parse source response: {0}")]
    Parse(String),
}

impl Retryable for SourceError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::IntegrityMismatch { .. } | Self::Parse(_) => false,
        }
    }
}
