//! Vector store error types.

use norma_source::Retryable;

/// Errors that can occur talking to the vector store or running the indexer.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    /// HTTP transport error talking to the vector store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Vector store returned a non-success status code.
    #[error("vector store API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body didn't match the expected shape.
    #[error("failed to parse vector store response: {0}")]
    Parse(String),

    /// The embedder returned a vector of unexpected dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Embedding a batch of chunk texts failed.
    #[error("embedding failed: {0}")]
    Embed(#[from] norma_embed::EmbedError),

    /// A repository call against the chunk store failed.
    #[error(transparent)]
    Database(#[from] norma_db::error::DatabaseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Retryable for VectorError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) | Self::DimensionMismatch { .. } | Self::Embed(_) | Self::Database(_) | Self::Other(_) => false,
        }
    }
}
