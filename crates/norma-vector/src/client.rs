//! Qdrant-REST-style vector store client: collection lifecycle, batch
//! point upsert, payload retrieval, and scroll-based cleanup.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::VectorStoreConfig;
use crate::error::VectorError;
use crate::payload::{PayloadFingerprint, PointPayload, point_id_for_chunk};

/// Distance metric used for the collection. Cosine is the only one this
/// pipeline ever creates.
pub const DISTANCE_COSINE: &str = "Cosine";

pub struct VectorStoreClient {
    http: reqwest::Client,
    config: VectorStoreConfig,
}

impl VectorStoreClient {
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: VectorStoreConfig) -> Self {
        Self { http: reqwest::Client::builder().user_agent("norma-vector/0.1").build().expect("reqwest client should build"), config }
    }

    async fn check(resp: reqwest::Response) -> Result<String, VectorError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(VectorError::Api { status: status.as_u16(), message: body });
        }
        Ok(body)
    }

    /// Create the collection if it doesn't already exist, sized to `dim`
    /// dimensions with cosine distance. Idempotent: an existing-collection
    /// conflict from the store is treated as success.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError`] on transport or unexpected-status failures.
    pub async fn ensure_collection(&self, dim: usize) -> Result<(), VectorError> {
        let body = json!({ "vectors": { "size": dim, "distance": DISTANCE_COSINE } });
        let resp = self.http.put(self.config.collection_url()).timeout(self.config.timeout()).json(&body).send().await?;
        if resp.status().as_u16() == 409 {
            return Ok(());
        }
        Self::check(resp).await.map(|_| ())
    }

    /// Upsert a batch of `(chunk, vector)` pairs as points.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError`] on transport or unexpected-status failures.
    pub async fn upsert_points(&self, items: &[(PointPayload, Vec<f32>)]) -> Result<(), VectorError> {
        if items.is_empty() {
            return Ok(());
        }
        let points: Vec<Value> = items
            .iter()
            .map(|(payload, vector)| {
                json!({
                    "id": point_id_for_chunk(&payload.chunk_id),
                    "vector": vector,
                    "payload": payload,
                })
            })
            .collect();
        let resp = self
            .http
            .put(format!("{}?wait=true", self.config.points_url()))
            .timeout(self.config.timeout())
            .json(&json!({ "points": points }))
            .send()
            .await?;
        Self::check(resp).await.map(|_| ())
    }

    /// Bulk-retrieve the fingerprint fields of existing points by id. Points
    /// that don't exist yet are simply absent from the returned map.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError`] on transport, unexpected-status, or parse failures.
    pub async fn retrieve_fingerprints(&self, point_ids: &[String]) -> Result<std::collections::HashMap<String, PayloadFingerprint>, VectorError> {
        if point_ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }
        let body = json!({ "ids": point_ids, "with_payload": true, "with_vector": false });
        let resp = self
            .http
            .post(format!("{}/points", self.config.collection_url()))
            .timeout(self.config.timeout())
            .json(&body)
            .send()
            .await?;
        let text = Self::check(resp).await?;
        let parsed: RetrieveResponse = serde_json::from_str(&text).map_err(|e| VectorError::Parse(e.to_string()))?;

        let mut out = std::collections::HashMap::new();
        for point in parsed.result {
            if let Ok(fingerprint) = serde_json::from_value::<PayloadFingerprint>(point.payload) {
                out.insert(point.id, fingerprint);
            }
        }
        Ok(out)
    }

    /// Scroll the whole collection (or one norm's points, if `id_norma` is
    /// given) returning just `chunk_id` payload fields, for cleanup
    /// cross-checking against the authoritative doc store.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError`] on transport, unexpected-status, or parse failures.
    pub async fn scroll_chunk_ids(&self, id_norma: Option<&str>, batch_size: usize) -> Result<Vec<(String, String)>, VectorError> {
        let mut out = Vec::new();
        let mut offset: Option<Value> = None;

        loop {
            let mut body = json!({
                "limit": batch_size,
                "with_payload": ["chunk_id", "id_norma"],
                "with_vector": false,
            });
            if let Some(id_norma) = id_norma {
                body["filter"] = json!({ "must": [{ "key": "id_norma", "match": { "value": id_norma } }] });
            }
            if let Some(offset) = &offset {
                body["offset"] = offset.clone();
            }

            let resp = self
                .http
                .post(format!("{}/points/scroll", self.config.collection_url()))
                .timeout(self.config.timeout())
                .json(&body)
                .send()
                .await?;
            let text = Self::check(resp).await?;
            let parsed: ScrollResponse = serde_json::from_str(&text).map_err(|e| VectorError::Parse(e.to_string()))?;

            for point in &parsed.result.points {
                if let Some(chunk_id) = point.payload.get("chunk_id").and_then(Value::as_str) {
                    out.push((point.id.clone(), chunk_id.to_string()));
                }
            }

            offset = parsed.result.next_page_offset;
            if offset.is_none() {
                break;
            }
        }

        Ok(out)
    }

    /// Run a nearest-neighbor search with an optional filter, returning
    /// scored points with their full payload.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError`] on transport, unexpected-status, or parse failures.
    pub async fn search_points(&self, vector: &[f32], filter: Option<Value>, limit: usize) -> Result<Vec<ScoredPoint>, VectorError> {
        let mut body = json!({ "vector": vector, "limit": limit, "with_payload": true, "with_vector": false });
        if let Some(filter) = filter {
            body["filter"] = filter;
        }

        let resp = self
            .http
            .post(format!("{}/points/search", self.config.collection_url()))
            .timeout(self.config.timeout())
            .json(&body)
            .send()
            .await?;
        let text = Self::check(resp).await?;
        let parsed: SearchResponse = serde_json::from_str(&text).map_err(|e| VectorError::Parse(e.to_string()))?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|point| serde_json::from_value::<PointPayload>(point.payload).ok().map(|payload| ScoredPoint { score: point.score, payload }))
            .collect())
    }

    /// Delete points by id.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError`] on transport or unexpected-status failures.
    pub async fn delete_points(&self, point_ids: &[String]) -> Result<(), VectorError> {
        if point_ids.is_empty() {
            return Ok(());
        }
        let resp = self
            .http
            .post(format!("{}/delete?wait=true", self.config.points_url()))
            .timeout(self.config.timeout())
            .json(&json!({ "points": point_ids }))
            .send()
            .await?;
        Self::check(resp).await.map(|_| ())
    }
}

#[derive(Deserialize)]
struct RetrieveResponse {
    result: Vec<RetrievedPoint>,
}

#[derive(Deserialize)]
struct RetrievedPoint {
    id: String,
    #[serde(default)]
    payload: Value,
}

/// One search hit: similarity score plus the point's full canonical payload.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    pub score: f32,
    pub payload: PointPayload,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    score: f32,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Deserialize)]
struct ScrollResult {
    points: Vec<ScrollPoint>,
    next_page_offset: Option<Value>,
}

#[derive(Deserialize)]
struct ScrollPoint {
    id: String,
    #[serde(default)]
    payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_upsert_is_a_noop() {
        let client = VectorStoreClient::new(VectorStoreConfig::new("http://127.0.0.1:1", "unidades"));
        assert!(client.upsert_points(&[]).await.is_ok());
    }

    #[tokio::test]
    async fn empty_retrieve_is_a_noop() {
        let client = VectorStoreClient::new(VectorStoreConfig::new("http://127.0.0.1:1", "unidades"));
        let result = client.retrieve_fingerprints(&[]).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn empty_delete_is_a_noop() {
        let client = VectorStoreClient::new(VectorStoreConfig::new("http://127.0.0.1:1", "unidades"));
        assert!(client.delete_points(&[]).await.is_ok());
    }

    #[test]
    fn parses_retrieve_response_shape() {
        let body = r#"{"result":[{"id":"abc","payload":{"id_norma":"N1","id_unidad":"U1","texto_hash":"h","chunking_hash":"c","vigencia_desde":0,"vigencia_hasta":253402300799000}}]}"#;
        let parsed: RetrieveResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.len(), 1);
        let fp: PayloadFingerprint = serde_json::from_value(parsed.result[0].payload.clone()).unwrap();
        assert_eq!(fp.id_norma, "N1");
    }

    #[test]
    fn parses_scroll_response_with_next_page() {
        let body = r#"{"result":{"points":[{"id":"p1","payload":{"chunk_id":"chunk_1"}}],"next_page_offset":"p2"}}"#;
        let parsed: ScrollResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.points.len(), 1);
        assert_eq!(parsed.result.next_page_offset, Some(Value::String("p2".to_string())));
    }

    #[test]
    fn parses_search_response_shape() {
        let body = r#"{"result":[{"score":0.91,"payload":{"chunk_id":"chunk_1","id_norma":"N1","id_unidad":"U1","unidad_tipo":"ARTICULO","unidad_ref":"Art. 1","titulo":null,"territorio_codigo":null,"territorio_tipo":null,"territorio_nombre":null,"vigencia_desde":0,"vigencia_hasta":253402300799000,"url_html_consolidada":null,"url_eli":null,"tags":[],"text":"texto","texto_hash":"h","chunking_hash":"c"}}]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.len(), 1);
        let payload: PointPayload = serde_json::from_value(parsed.result[0].payload.clone()).unwrap();
        assert_eq!(payload.id_norma, "N1");
    }

    #[tokio::test]
    async fn search_with_unreachable_store_errors() {
        let client = VectorStoreClient::new(VectorStoreConfig::new("http://127.0.0.1:1", "unidades"));
        assert!(client.search_points(&[0.1, 0.2], None, 8).await.is_err());
    }

    #[test]
    fn parses_scroll_response_last_page() {
        let body = r#"{"result":{"points":[],"next_page_offset":null}}"#;
        let parsed: ScrollResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.result.points.is_empty());
        assert!(parsed.result.next_page_offset.is_none());
    }
}
