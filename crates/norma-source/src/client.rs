//! Source API client: discover/index/bloque endpoints, each
//! request wrapped in bounded retry-with-backoff.

use std::time::Duration;

use serde::Deserialize;

use crate::config::SourceClientConfig;
use crate::error::SourceError;
use crate::http::check_response;
use crate::retry::{BackoffConfig, retry_with_backoff};
use crate::status::{check_json_status, check_xml_status};
use crate::url::{bloque_url, discover_url, index_url};

/// One page of discover results: the raw item values (normalized by
/// `norma-parser::discover::normalize`, one call per item) plus whether the
/// page was full, a hint the caller uses to decide whether to request more.
#[derive(Debug, Clone)]
pub struct DiscoverPage {
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    status: DiscoverStatus,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DiscoverStatus {
    code: String,
}

pub struct SourceClient {
    http: reqwest::Client,
    config: SourceClientConfig,
}

impl SourceClient {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: SourceClientConfig) -> Self {
        let http = reqwest::Client::builder().user_agent(config.user_agent.clone()).build().expect("reqwest client should build");
        Self { http, config }
    }

    fn backoff(&self) -> BackoffConfig {
        BackoffConfig::new(self.config.max_attempts, Duration::from_millis(self.config.retry_base_delay_ms))
    }

    /// Fetch one page of discover results.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport, status, or integrity failures.
    pub async fn discover(&self, from: Option<&str>, to: Option<&str>, offset: u64, limit: u64, query: Option<&str>) -> Result<DiscoverPage, SourceError> {
        let url = discover_url(self.config.trimmed_base(), from, to, Some(offset), Some(limit), query);
        let body = retry_with_backoff(self.backoff(), || async {
            let resp = self.http.get(&url).timeout(self.config.timeout()).send().await?;
            check_response(resp).await
        })
        .await?;

        check_json_status(&body)?;
        let parsed: DiscoverResponse = serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))?;
        if parsed.status.code != "200" {
            return Err(SourceError::IntegrityMismatch { code: parsed.status.code });
        }
        Ok(DiscoverPage { items: parsed.data })
    }

    /// Fetch a norm's index XML.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport, status, or integrity failures.
    pub async fn fetch_index_xml(&self, id_norma: &str) -> Result<String, SourceError> {
        let url = index_url(self.config.trimmed_base(), id_norma);
        let body = retry_with_backoff(self.backoff(), || async {
            let resp = self.http.get(&url).timeout(self.config.timeout()).send().await?;
            check_response(resp).await
        })
        .await?;
        check_xml_status(&body)?;
        Ok(body)
    }

    /// Fetch one block's XML. A 404 is a permanent, non-retryable "not
    /// found" — the caller treats it as skip-and-continue, so it
    /// comes back as `Ok(None)` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport, non-404 status, or integrity
    /// failures.
    pub async fn fetch_bloque_xml(&self, id_norma: &str, id_bloque: &str) -> Result<Option<String>, SourceError> {
        let url = bloque_url(self.config.trimmed_base(), id_norma, id_bloque);
        let result = retry_with_backoff(self.backoff(), || async {
            let resp = self.http.get(&url).timeout(self.config.timeout()).send().await?;
            if resp.status().as_u16() == 404 {
                tracing::warn!(id_norma, id_bloque, "bloque not found, skipping");
                return Ok(None);
            }
            check_response(resp).await.map(Some)
        })
        .await?;

        match result {
            None => Ok(None),
            Some(body) => {
                check_xml_status(&body)?;
                Ok(Some(body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> SourceClientConfig {
        SourceClientConfig::new("http://127.0.0.1:1").with_retries(1, 1)
    }

    #[tokio::test]
    async fn discover_against_unreachable_host_is_retryable_http_error() {
        let client = SourceClient::new(unreachable_config());
        let err = client.discover(None, None, 0, 10, None).await.unwrap_err();
        assert!(matches!(err, SourceError::Http(_)));
    }

    #[tokio::test]
    async fn fetch_index_xml_against_unreachable_host_is_http_error() {
        let client = SourceClient::new(unreachable_config());
        let err = client.fetch_index_xml("BOE-A-1").await.unwrap_err();
        assert!(matches!(err, SourceError::Http(_)));
    }

    #[test]
    fn discover_response_parses_wrapped_items() {
        let body = r#"{"status":{"code":"200","text":"OK"},"data":[{"identificador":"BOE-A-1"}]}"#;
        let parsed: DiscoverResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status.code, "200");
        assert_eq!(parsed.data.len(), 1);
    }

    #[tokio::test]
    #[ignore] // requires network
    async fn live_discover_first_page() {
        let client = SourceClient::new(SourceClientConfig::default());
        let page = client.discover(None, None, 0, 5, None).await.unwrap();
        assert!(!page.items.is_empty());
    }
}
