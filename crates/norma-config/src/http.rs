//! Source-API HTTP client configuration.

use serde::{Deserialize, Serialize};

const fn default_request_concurrency() -> u32 {
    8
}

const fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    String::from("norma-ingestor/0.1")
}

const fn default_retry_count() -> u32 {
    3
}

const fn default_retry_backoff_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Bounded fan-out for concurrent source-API requests.
    #[serde(default = "default_request_concurrency")]
    pub request_concurrency: u32,

    /// Per-request timeout, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// `User-Agent` header sent on every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum retry attempts for a retryable error.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff, in milliseconds, before exponential/jitter scaling.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_concurrency: default_request_concurrency(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}
