//! Source-API HTTP client configuration.
//!
//! Mirrors `norma-config`'s `http`/`source` sections without depending on
//! that crate — `norma-cli` does the conversion at the top of the stack.

use std::time::Duration;

fn default_base_url() -> String {
    String::from("https://www.boe.es/datosabiertos/api/legislacion-consolidada")
}

fn default_user_agent() -> String {
    String::from("norma-ingestor/0.1")
}

/// Connection and retry settings for the source API client.
#[derive(Debug, Clone)]
pub struct SourceClientConfig {
    /// Base URL for the discover/index/bloque endpoints. Trailing slashes
    /// are stripped before interpolation.
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for SourceClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: 10_000,
            user_agent: default_user_agent(),
            max_attempts: 3,
            retry_base_delay_ms: 250,
        }
    }
}

impl SourceClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_retries(mut self, max_attempts: u32, retry_base_delay_ms: u64) -> Self {
        self.max_attempts = max_attempts;
        self.retry_base_delay_ms = retry_base_delay_ms;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `base_url` with any trailing slashes removed.
    #[must_use]
    pub fn trimmed_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SourceClientConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout_ms, 10_000);
        assert!(config.user_agent.contains("norma-ingestor"));
    }

    #[test]
    fn trims_trailing_slashes() {
        let config = SourceClientConfig::new("https://example.org/api//");
        assert_eq!(config.trimmed_base(), "https://example.org/api");
    }
}
