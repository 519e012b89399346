//! Retrieval HTTP surface configuration.

use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    String::from("0.0.0.0:8787")
}

const fn default_top_k() -> u32 {
    8
}

const fn default_max_top_k() -> u32 {
    50
}

const fn default_min_score() -> f32 {
    0.0
}

const fn default_max_candidates() -> u32 {
    200
}

const fn default_candidate_multiplier() -> u32 {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Address `norma-api`'s axum server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// `topK` used when a search/answer request omits it.
    #[serde(default = "default_top_k")]
    pub default_top_k: u32,

    /// Upper bound a request's `topK` is clamped to.
    #[serde(default = "default_max_top_k")]
    pub max_top_k: u32,

    /// `minScore` used when a request omits it.
    #[serde(default = "default_min_score")]
    pub default_min_score: f32,

    /// Hard ceiling on candidates fetched from the vector store per search.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u32,

    /// Candidates are fetched as `topK * candidate_multiplier`, capped by
    /// `max_candidates`, so the boost pass has enough of a pool to re-rank.
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            default_top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            default_min_score: default_min_score(),
            max_candidates: default_max_candidates(),
            candidate_multiplier: default_candidate_multiplier(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ApiConfig::default();
        assert_eq!(config.default_top_k, 8);
        assert_eq!(config.max_top_k, 50);
        assert_eq!(config.max_candidates, 200);
    }
}
