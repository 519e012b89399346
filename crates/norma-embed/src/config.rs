//! Per-backend and overall embedder configuration.
//!
//! Mirrors the shape of `norma-config::embeddings::EmbeddingsConfig` field
//! for field (provider/fallback/model/timeout/local url/api key) without a
//! dependency on that crate — the CLI layer is what converts one into the
//! other, keeping `norma-embed` usable standalone.

use std::time::Duration;

/// Which embedder backend a [`BackendConfig`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Local HTTP POST, payload shape negotiated (`{model, input}` or `{model, prompt}`).
    Local,
    /// Remote OpenAI-compatible `/embeddings` endpoint.
    OpenaiCompatible,
}

/// Default OpenAI embeddings endpoint, used when a remote backend doesn't
/// override `url`.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/embeddings";

/// Configuration for a single embedder backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub url: String,
    pub model: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

impl BackendConfig {
    #[must_use]
    pub fn local(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { kind: BackendKind::Local, url: url.into(), model: model.into(), api_key: String::new(), timeout_ms: 15_000 }
    }

    #[must_use]
    pub fn openai(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            kind: BackendKind::OpenaiCompatible,
            url: DEFAULT_OPENAI_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            timeout_ms: 15_000,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Primary backend plus an optional fallback, and the retry policy applied
/// to each before the fallback (or the final error) is returned.
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    pub primary: BackendConfig,
    pub fallback: Option<BackendConfig>,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl EmbedderConfig {
    #[must_use]
    pub fn new(primary: BackendConfig) -> Self {
        Self { primary, fallback: None, max_attempts: 3, retry_base_delay_ms: 250 }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: BackendConfig) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_backend_defaults() {
        let backend = BackendConfig::local("http://localhost:8080/embeddings", "bge-small");
        assert_eq!(backend.kind, BackendKind::Local);
        assert_eq!(backend.timeout_ms, 15_000);
        assert!(backend.api_key.is_empty());
    }

    #[test]
    fn openai_backend_default_url() {
        let backend = BackendConfig::openai("text-embedding-3-small", "sk-test");
        assert_eq!(backend.url, DEFAULT_OPENAI_URL);
        assert_eq!(backend.api_key, "sk-test");
    }

    #[test]
    fn embedder_config_without_fallback() {
        let config = EmbedderConfig::new(BackendConfig::local("http://x", "m"));
        assert!(!config.has_fallback());
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn embedder_config_with_fallback() {
        let config = EmbedderConfig::new(BackendConfig::local("http://x", "m"))
            .with_fallback(BackendConfig::openai("text-embedding-3-small", "sk-test"));
        assert!(config.has_fallback());
    }
}
