//! Embedder client: retries each backend, then falls back to the secondary
//! backend if configured.

use norma_source::{BackoffConfig, retry_with_backoff};

use crate::backend::call_backend;
use crate::config::{BackendConfig, EmbedderConfig};
use crate::error::EmbedError;

/// HTTP client for generating embeddings, with backend retry and fallback.
pub struct Embedder {
    http: reqwest::Client,
    config: EmbedderConfig,
}

impl Embedder {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: EmbedderConfig) -> Self {
        Self {
            http: reqwest::Client::builder().user_agent("norma-embed/0.1").build().expect("reqwest client should build"),
            config,
        }
    }

    fn backoff(&self) -> BackoffConfig {
        BackoffConfig::new(self.config.max_attempts, std::time::Duration::from_millis(self.config.retry_base_delay_ms))
    }

    async fn embed_via(&self, backend: &BackendConfig, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let vectors = retry_with_backoff(self.backoff(), || call_backend(&self.http, backend, texts)).await?;
        if vectors.len() != texts.len() {
            return Err(EmbedError::CountMismatch { expected: texts.len(), got: vectors.len() });
        }
        Ok(vectors)
    }

    /// Embed a batch of texts, preserving input order. Tries the primary
    /// backend (with retry); on exhaustion falls back to the configured
    /// fallback backend (also with retry) if one is set.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::AllBackendsFailed`] if every configured backend
    /// failed, or the primary's own error if no fallback is configured.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let primary_err = match self.embed_via(&self.config.primary, texts).await {
            Ok(vectors) => return Ok(vectors),
            Err(err) => err,
        };

        let Some(fallback) = &self.config.fallback else {
            return Err(primary_err);
        };

        tracing::warn!(%primary_err, "primary embedder backend failed, trying fallback");
        match self.embed_via(fallback, texts).await {
            Ok(vectors) => Ok(vectors),
            Err(fallback_err) => Err(EmbedError::AllBackendsFailed(format!("primary: {primary_err}; fallback: {fallback_err}"))),
        }
    }

    /// Embed a single text; convenience wrapper over [`Self::embed_batch`].
    ///
    /// # Errors
    ///
    /// See [`Self::embed_batch`].
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(std::slice::from_ref(&text.to_string())).await?;
        Ok(vectors.pop().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let embedder = Embedder::new(EmbedderConfig::new(BackendConfig::local("http://127.0.0.1:1/embeddings", "m")));
        let result = embedder.embed_batch(&[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    #[ignore] // requires a reachable embedder endpoint
    async fn live_local_embed() {
        let embedder = Embedder::new(EmbedderConfig::new(BackendConfig::local("http://localhost:8080/embeddings", "bge-small")));
        let result = embedder.embed_one("hola mundo").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn falls_back_when_primary_unreachable() {
        let config = EmbedderConfig::new(BackendConfig::local("http://127.0.0.1:1/embeddings", "m").with_timeout_ms(50))
            .with_fallback(BackendConfig::local("http://127.0.0.1:2/embeddings", "m").with_timeout_ms(50));
        let mut config = config;
        config.max_attempts = 1;
        let embedder = Embedder::new(config);
        let result = embedder.embed_batch(&["x".to_string()]).await;
        assert!(matches!(result, Err(EmbedError::AllBackendsFailed(_))));
    }
}
