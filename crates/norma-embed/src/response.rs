//! Tolerant parsing of embedder response bodies.
//!
//! Backends that speak this API return either an OpenAI-style
//! `{"data": [{"embedding": [...], "index": N}, ...]}` body, or a flatter
//! `{"embeddings": [[...], ...]}` body. Both are accepted; the OpenAI shape
//! is re-sorted by `index` since providers don't guarantee response order
//! matches request order.

use serde::Deserialize;

use crate::error::EmbedError;

#[derive(Debug, Deserialize)]
struct OpenAiStyle {
    data: Vec<OpenAiEmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Deserialize)]
struct FlatStyle {
    embeddings: Vec<Vec<f32>>,
}

/// Parse a response body into one vector per input, in input order.
///
/// # Errors
///
/// Returns [`EmbedError::Parse`] if the body matches neither known shape.
pub fn parse_embeddings(body: &str) -> Result<Vec<Vec<f32>>, EmbedError> {
    if let Ok(parsed) = serde_json::from_str::<OpenAiStyle>(body) {
        let mut items = parsed.data;
        items.sort_by_key(|item| item.index);
        return Ok(items.into_iter().map(|item| item.embedding).collect());
    }
    if let Ok(parsed) = serde_json::from_str::<FlatStyle>(body) {
        return Ok(parsed.embeddings);
    }
    Err(EmbedError::Parse(format!("unrecognized embedder response shape: {}", truncate(body, 200))))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_openai_style_in_order() {
        let body = r#"{"data":[{"embedding":[0.3,0.4],"index":1},{"embedding":[0.1,0.2],"index":0}]}"#;
        let vectors = parse_embeddings(body).unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn parses_flat_style() {
        let body = r#"{"embeddings":[[0.1,0.2],[0.3,0.4]]}"#;
        let vectors = parse_embeddings(body).unwrap();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn rejects_unknown_shape() {
        let body = r#"{"unexpected":true}"#;
        assert!(parse_embeddings(body).is_err());
    }
}
