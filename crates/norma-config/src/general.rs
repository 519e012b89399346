//! General pipeline behavior configuration.

use serde::{Deserialize, Serialize};

/// Text extraction strategy for index/bloque XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextExtractor {
    Fastxml,
    Xpath,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::Fastxml
    }
}

const fn default_normalize_territory() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Which XML extraction strategy the parser crate uses.
    #[serde(default)]
    pub text_extractor: TextExtractor,

    /// Whether to resolve and upsert `TerritorioCatalog` rows during sync.
    #[serde(default = "default_normalize_territory")]
    pub normalize_territory: bool,

    /// Whether raw XML/JSON snapshots are kept in the object store (vs. just hashed).
    #[serde(default)]
    pub store_raw_snapshots: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            text_extractor: TextExtractor::default(),
            normalize_territory: default_normalize_territory(),
            store_raw_snapshots: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.text_extractor, TextExtractor::Fastxml);
        assert!(config.normalize_territory);
        assert!(!config.store_raw_snapshots);
    }
}
