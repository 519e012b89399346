//! Embedding error types.

use norma_source::Retryable;

/// Errors that can occur during embedding generation.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// HTTP transport error talking to a backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status code.
    #[error("embedder API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body didn't match any shape this crate understands.
    #[error("failed to parse embedder response: {0}")]
    Parse(String),

    /// Backend returned a different number of vectors than inputs given.
    #[error("embedder returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },

    /// Both the primary and fallback backend failed.
    #[error("all embedder backends failed: {0}")]
    AllBackendsFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Retryable for EmbedError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) | Self::CountMismatch { .. } | Self::AllBackendsFailed(_) | Self::Other(_) => false,
        }
    }
}
