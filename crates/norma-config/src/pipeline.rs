//! Per-stage concurrency and rate-limit configuration for the orchestrator.

use serde::{Deserialize, Serialize};

const fn default_duration_ms() -> u64 {
    1_000
}

/// A token-bucket style `{max, duration}` rate limit, or none.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimit {
    /// Max operations allowed per `duration_ms` window. `0` means unlimited.
    #[serde(default)]
    pub max: u32,

    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max: 0,
            duration_ms: default_duration_ms(),
        }
    }
}

impl RateLimit {
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.max == 0
    }
}

const fn default_sync_concurrency() -> u32 {
    4
}

const fn default_build_concurrency() -> u32 {
    4
}

const fn default_index_concurrency() -> u32 {
    2
}

const fn default_orchestrator_concurrency() -> u32 {
    1
}

/// Bounded concurrency (and optional rate limit) for each of the four
/// orchestrator stages. `4 × concurrency[stage]` is the backpressure ceiling
/// `waitForQueueCapacity` enforces before seeding a new batch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_sync_concurrency")]
    pub sync_concurrency: u32,
    #[serde(default = "default_build_concurrency")]
    pub build_concurrency: u32,
    #[serde(default = "default_index_concurrency")]
    pub index_concurrency: u32,
    #[serde(default = "default_orchestrator_concurrency")]
    pub orchestrator_concurrency: u32,

    #[serde(default)]
    pub sync_rate_limit: RateLimit,
    #[serde(default)]
    pub build_rate_limit: RateLimit,
    #[serde(default)]
    pub index_rate_limit: RateLimit,
    #[serde(default)]
    pub orchestrator_rate_limit: RateLimit,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sync_concurrency: default_sync_concurrency(),
            build_concurrency: default_build_concurrency(),
            index_concurrency: default_index_concurrency(),
            orchestrator_concurrency: default_orchestrator_concurrency(),
            sync_rate_limit: RateLimit::default(),
            build_rate_limit: RateLimit::default(),
            index_rate_limit: RateLimit::default(),
            orchestrator_rate_limit: RateLimit::default(),
        }
    }
}

impl PipelineConfig {
    /// The `4 × concurrency` backpressure ceiling for `stage`.
    #[must_use]
    pub fn depth_ceiling(&self, concurrency: u32) -> u32 {
        4 * concurrency
    }
}
