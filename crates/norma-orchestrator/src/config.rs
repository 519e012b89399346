//! Orchestrator configuration.
//!
//! Mirrors `norma-config`'s `pipeline`/`general`/`storage`/`chunk` sections
//! without depending on that crate — `norma-cli` does the conversion at the
//! top of the stack.

use norma_chunk::config::ChunkConfig;
use norma_core::enums::ChunkMethod;

/// A token-bucket style `{max, duration}` rate limit, or none (`max == 0`).
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub max: u32,
    pub duration_ms: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self { max: 0, duration_ms: 1_000 }
    }
}

impl RateLimit {
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.max == 0
    }
}

/// Bounded concurrency for each of the four orchestrator stages, plus the
/// behavior knobs the sync stage consults (territorio normalization, raw
/// snapshot retention).
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub sync_concurrency: u32,
    pub build_concurrency: u32,
    pub index_concurrency: u32,
    pub orchestrator_concurrency: u32,

    pub sync_rate_limit: RateLimit,
    pub build_rate_limit: RateLimit,
    pub index_rate_limit: RateLimit,

    pub normalize_territory: bool,
    pub store_raw_snapshots: bool,
    pub storage_root: String,

    pub chunk_method: ChunkMethod,
    pub chunk_size: usize,
    pub chunk_overlap: usize,

    /// Polling granularity for `wait_for_queue_capacity`.
    pub backpressure_poll_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            sync_concurrency: 4,
            build_concurrency: 4,
            index_concurrency: 2,
            orchestrator_concurrency: 1,
            sync_rate_limit: RateLimit::default(),
            build_rate_limit: RateLimit::default(),
            index_rate_limit: RateLimit::default(),
            normalize_territory: true,
            store_raw_snapshots: false,
            storage_root: String::from("./.norma/store"),
            chunk_method: ChunkMethod::Recursive,
            chunk_size: 1_000,
            chunk_overlap: 100,
            backpressure_poll_ms: 1_000,
        }
    }
}

impl OrchestratorConfig {
    /// The `4 × concurrency` backpressure ceiling for a stage's queue.
    #[must_use]
    pub const fn depth_ceiling(concurrency: u32) -> u32 {
        4 * concurrency
    }

    #[must_use]
    pub const fn chunking(&self) -> ChunkConfig {
        ChunkConfig { method: self.chunk_method, chunk_size: self.chunk_size, overlap: self.chunk_overlap }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.sync_concurrency, 4);
        assert_eq!(config.index_concurrency, 2);
        assert!(config.sync_rate_limit.is_unlimited());
    }

    #[test]
    fn depth_ceiling_is_four_times_concurrency() {
        assert_eq!(OrchestratorConfig::depth_ceiling(4), 16);
    }
}
