//! Source-API base URL and endpoint templates.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    String::from("https://www.boe.es/datosabiertos/api/legislacion-consolidada")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Base URL for the discover/index/bloque endpoints. Trailing slashes are
    /// stripped before interpolation.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl SourceConfig {
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
    fn trimmed_base_strips_trailing_slashes() {
        let config = SourceConfig {
            base_url: "https://example.org/api//".into(),
        };
        assert_eq!(config.trimmed_base(), "https://example.org/api");
    }
}
