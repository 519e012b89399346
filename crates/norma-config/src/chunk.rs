//! Default chunk-engine configuration (overridable per `builder build-chunks` invocation).

use norma_core::enums::ChunkMethod;
use serde::{Deserialize, Serialize};

const fn default_chunk_size() -> usize {
    1_000
}

const fn default_overlap() -> usize {
    100
}

const fn default_method() -> ChunkMethod {
    ChunkMethod::Recursive
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkConfig {
    #[serde(default = "default_method")]
    pub method: ChunkMethod,

    #[serde(default = "default_chunk_size")]
    pub size: usize,

    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ChunkConfig::default();
        assert_eq!(config.method, ChunkMethod::Recursive);
        assert_eq!(config.size, 1_000);
        assert_eq!(config.overlap, 100);
    }
}
