//! Embedder provider configuration.

use serde::{Deserialize, Serialize};

/// Which embedder backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingsProvider {
    Local,
    Openai,
}

const fn default_provider() -> EmbeddingsProvider {
    EmbeddingsProvider::Local
}

fn default_model() -> String {
    String::from("text-embedding-3-small")
}

const fn default_timeout_ms() -> u64 {
    15_000
}

fn default_local_url() -> String {
    String::from("http://localhost:8080/embeddings")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingsConfig {
    /// Primary backend used for every embed call.
    #[serde(default = "default_provider")]
    pub provider: EmbeddingsProvider,

    /// Backend to fall back to when `provider` fails after its own retries.
    #[serde(default)]
    pub fallback_provider: Option<EmbeddingsProvider>,

    /// Model name sent in the request body.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Base URL for the `local` provider's HTTP POST endpoint.
    #[serde(default = "default_local_url")]
    pub local_embeddings_url: String,

    /// API key for the `openai`-compatible provider, if configured.
    #[serde(default)]
    pub api_key: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            fallback_provider: None,
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            local_embeddings_url: default_local_url(),
            api_key: String::new(),
        }
    }
}

impl EmbeddingsConfig {
    /// Whether a usable fallback backend is configured.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback_provider.is_some()
    }
}
