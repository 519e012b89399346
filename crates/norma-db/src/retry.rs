//! Transient libSQL error retry logic.
//!
//! Provides automatic retry with exponential backoff for transient remote
//! infrastructure errors (node recycling, shared lock contention during
//! provisioning/deletion) that surface as 400-level Hrana responses and
//! resolve on their own within seconds. Local-only databases never hit
//! this path.

use std::time::Duration;

/// Configuration for retry behavior on transient libSQL errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Detect transient remote infrastructure errors.
///
/// These occur when a remote node is being created, deleted, or recycled.
/// They are not application bugs and resolve on their own within seconds.
/// The predicate is intentionally narrow to avoid retrying genuine SQL or
/// constraint errors.
#[must_use]
pub fn is_transient_libsql_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unable to acquire shared lock") || msg.contains("deletion must be in progress")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retry_config_is_bounded() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 4);
        assert!(config.max_delay >= config.base_delay);
    }
}
