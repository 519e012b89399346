//! Runtime configuration for the retrieval HTTP surface.
//!
//! Mirrors `norma-config::api::ApiConfig` without depending on that crate —
//! `norma-cli` does the conversion at the top of the stack (the same split
//! `norma-orchestrator::OrchestratorConfig` uses for the pipeline side).

/// Tunables for `/rag/search` and `/rag/answer`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub default_top_k: u32,
    pub max_top_k: u32,
    pub default_min_score: f32,
    pub max_candidates: u32,
    pub candidate_multiplier: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::from("0.0.0.0:8787"),
            default_top_k: 8,
            max_top_k: 50,
            default_min_score: 0.0,
            max_candidates: 200,
            candidate_multiplier: 4,
        }
    }
}

impl ApiConfig {
    /// Candidate pool size for one search: `min(max_candidates, max(topK, topK * multiplier))`.
    #[must_use]
    pub fn candidate_count(&self, top_k: u32) -> usize {
        let scaled = top_k.saturating_mul(self.candidate_multiplier);
        top_k.max(scaled).min(self.max_candidates) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_count_scales_then_caps() {
        let config = ApiConfig::default();
        assert_eq!(config.candidate_count(8), 32);
        assert_eq!(config.candidate_count(50), 200);
    }

    #[test]
    fn candidate_count_never_drops_below_top_k() {
        let config = ApiConfig { candidate_multiplier: 0, ..ApiConfig::default() };
        assert_eq!(config.candidate_count(8), 8);
    }
}
