//! # norma-config
//!
//! Layered configuration loading for the ingestion/retrieval pipeline using `figment`.
//!
//! Configuration sources (lowest to highest priority):
//! 1. Built-in defaults (each section's `Default` impl)
//! 2. User-level `~/.config/norma/config.toml`
//! 3. Project-level `.norma/config.toml`
//! 4. Environment variables (prefix `NORMA_`, nested sections split on `__`,
//!    e.g. `NORMA_CHUNK__SIZE=1200`)

pub mod api;
pub mod chunk;
pub mod embeddings;
pub mod error;
pub mod general;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod vector;

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub use api::ApiConfig;
pub use chunk::ChunkConfig;
pub use embeddings::EmbeddingsConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use pipeline::PipelineConfig;
pub use source::SourceConfig;
pub use storage::StorageConfig;
pub use vector::VectorConfig;

mod http;
pub use http::HttpConfig;

/// Aggregate configuration for every pipeline crate, assembled by [`NormaConfig::load`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NormaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub chunk: ChunkConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub vector: VectorConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

fn project_config_path() -> PathBuf {
    PathBuf::from(".norma/config.toml")
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("norma").join("config.toml"))
}

impl NormaConfig {
    /// Load configuration from defaults, the user file, the project file, and
    /// `NORMA_*` environment variables, in that priority order.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(user_path) = user_config_path() {
            if user_path.exists() {
                figment = figment.merge(Toml::file(user_path));
            }
        }

        let project_path = project_config_path();
        if project_path.exists() {
            figment = figment.merge(Toml::file(project_path));
        }

        figment = figment.merge(Env::prefixed("NORMA_").split("__"));

        figment.extract().map_err(ConfigError::Figment)
    }

    /// Load configuration from in-memory defaults and the environment only,
    /// skipping any config files on disk. Used by tests.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("NORMA_").split("__"))
            .extract()
            .map_err(ConfigError::Figment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_env_falls_back_to_defaults() {
        let config = NormaConfig::load_from_env().expect("defaults must extract cleanly");
        assert_eq!(config.pipeline.sync_concurrency, 4);
        assert_eq!(config.chunk.size, 1_000);
    }

    #[test]
    fn env_override_applies_with_prefix_and_double_underscore_nesting() {
        std::env::set_var("NORMA_CHUNK__SIZE", "1500");
        let config = NormaConfig::load_from_env().expect("must extract with override");
        std::env::remove_var("NORMA_CHUNK__SIZE");
        assert_eq!(config.chunk.size, 1_500);
    }
}
