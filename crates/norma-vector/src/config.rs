//! Vector store client configuration.

use std::time::Duration;

/// Connection settings for the Qdrant-REST-style vector store.
#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    /// Base URL, e.g. `http://localhost:6333`, no trailing slash.
    pub base_url: String,
    pub collection: String,
    pub timeout_ms: u64,
}

impl VectorStoreConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), collection: collection.into(), timeout_ms: 15_000 }
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

    #[must_use]
    pub fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    #[must_use]
    pub fn points_url(&self) -> String {
        format!("{}/points", self.collection_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        let config = VectorStoreConfig::new("http://localhost:6333/", "unidades");
        assert_eq!(config.base_url, "http://localhost:6333");
    }

    #[test]
    fn builds_collection_and_points_urls() {
        let config = VectorStoreConfig::new("http://localhost:6333", "unidades");
        assert_eq!(config.collection_url(), "http://localhost:6333/collections/unidades");
        assert_eq!(config.points_url(), "http://localhost:6333/collections/unidades/points");
    }
}
