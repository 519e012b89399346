//! Vector store and indexer configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    String::from("http://localhost:6333")
}

fn default_collection() -> String {
    String::from("norma_chunks")
}

const fn default_batch_size() -> u32 {
    64
}

const fn default_embed_concurrency() -> u32 {
    8
}

const fn default_cleanup_scroll_batch_size() -> u32 {
    256
}

const fn default_cleanup_delete_batch_size() -> u32 {
    128
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorConfig {
    /// Base URL of the Qdrant-compatible HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Collection name the indexer ensures and upserts into.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Chunks streamed per indexing batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Bounded fan-out for concurrent embed calls within a batch.
    #[serde(default = "default_embed_concurrency")]
    pub embed_concurrency: u32,

    /// Whether post-index cleanup (orphan pruning) runs. Disabled when `--limit` is set.
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,

    #[serde(default = "default_cleanup_scroll_batch_size")]
    pub cleanup_scroll_batch_size: u32,

    #[serde(default = "default_cleanup_delete_batch_size")]
    pub cleanup_delete_batch_size: u32,
}

const fn default_true() -> bool {
    true
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection: default_collection(),
            batch_size: default_batch_size(),
            embed_concurrency: default_embed_concurrency(),
            cleanup_enabled: true,
            cleanup_scroll_batch_size: default_cleanup_scroll_batch_size(),
            cleanup_delete_batch_size: default_cleanup_delete_batch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = VectorConfig::default();
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.embed_concurrency, 8);
        assert!(config.cleanup_enabled);
        assert_eq!(config.collection, "norma_chunks");
    }
}
