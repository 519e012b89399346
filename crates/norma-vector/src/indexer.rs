//! Indexer: embeds and upserts `ChunkSemantico` rows into the vector store,
//! then cleans up stale points.

use futures::stream::{self, StreamExt};
use norma_core::entities::ChunkSemantico;
use norma_db::NormaDb;
use norma_embed::Embedder;

use crate::client::VectorStoreClient;
use crate::error::VectorError;
use crate::payload::{PointPayload, point_id_for_chunk};

/// Tunables for one indexing run.
#[derive(Debug, Clone, Copy)]
pub struct IndexerOptions {
    /// Chunks per batch streamed from the doc store.
    pub batch_size: usize,
    /// Bounded fan-out for concurrent embed calls within a batch.
    pub embed_concurrency: usize,
    /// Caps the run to the first N chunks; a capped run disables the cleanup pass.
    pub limit: Option<usize>,
    pub cleanup_scroll_batch_size: usize,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self { batch_size: 100, embed_concurrency: 8, limit: None, cleanup_scroll_batch_size: 256 }
    }
}

/// Per-run counters, returned to the CLI for its stats JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexerStats {
    pub seen: usize,
    pub embedded: usize,
    pub skipped_unchanged: usize,
    pub deleted: usize,
}

/// Run the indexer end to end for an optional norm scope.
///
/// # Errors
///
/// Returns [`VectorError`] if the doc store, embedder, or vector store fail.
pub async fn run_indexer(
    db: &NormaDb,
    embedder: &Embedder,
    vector: &VectorStoreClient,
    id_norma: Option<&str>,
    options: IndexerOptions,
) -> Result<IndexerStats, VectorError> {
    let mut chunks = db.list_chunks_ordered(id_norma).await?;
    if let Some(limit) = options.limit {
        chunks.truncate(limit);
    }

    let mut stats = IndexerStats::default();
    if chunks.is_empty() {
        return Ok(stats);
    }

    let probe_vector = embedder.embed_one(&chunks[0].texto).await?;
    vector.ensure_collection(probe_vector.len()).await?;

    let mut expected_point_ids: Vec<String> = Vec::with_capacity(chunks.len());

    for batch in chunks.chunks(options.batch_size) {
        stats.seen += batch.len();
        let payloads: Vec<PointPayload> = batch.iter().map(PointPayload::from_chunk).collect();
        let point_ids: Vec<String> = payloads.iter().map(|p| point_id_for_chunk(&p.chunk_id)).collect();
        expected_point_ids.extend(point_ids.iter().cloned());

        let existing = vector.retrieve_fingerprints(&point_ids).await?;

        let mut to_embed: Vec<(usize, &ChunkSemantico, PointPayload)> = Vec::new();
        for (i, (chunk, payload)) in batch.iter().zip(payloads.into_iter()).enumerate() {
            let point_id = &point_ids[i];
            match existing.get(point_id) {
                Some(existing_fp) if *existing_fp == payload.fingerprint() => {
                    stats.skipped_unchanged += 1;
                }
                _ => to_embed.push((i, chunk, payload)),
            }
        }

        if to_embed.is_empty() {
            continue;
        }

        let concurrency = options.embed_concurrency.max(1);
        let embedded: Vec<Result<(PointPayload, Vec<f32>), VectorError>> = stream::iter(to_embed.into_iter())
            .map(|(_, chunk, payload)| async move {
                let vector = embedder.embed_one(&chunk.texto).await?;
                Ok((payload, vector))
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut items = Vec::new();
        for result in embedded {
            items.push(result?);
        }
        stats.embedded += items.len();
        vector.upsert_points(&items).await?;
    }

    if options.limit.is_none() {
        stats.deleted = cleanup(vector, id_norma, &expected_point_ids, options.cleanup_scroll_batch_size).await?;
    }

    Ok(stats)
}

async fn cleanup(vector: &VectorStoreClient, id_norma: Option<&str>, expected: &[String], scroll_batch_size: usize) -> Result<usize, VectorError> {
    let expected: std::collections::HashSet<&str> = expected.iter().map(String::as_str).collect();
    let existing = vector.scroll_chunk_ids(id_norma, scroll_batch_size).await?;

    let stale: Vec<String> = existing.into_iter().filter(|(point_id, _)| !expected.contains(point_id.as_str())).map(|(point_id, _)| point_id).collect();

    if stale.is_empty() {
        return Ok(0);
    }
    let deleted = stale.len();
    vector.delete_points(&stale).await?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_sane() {
        let options = IndexerOptions::default();
        assert_eq!(options.batch_size, 100);
        assert_eq!(options.embed_concurrency, 8);
        assert!(options.limit.is_none());
    }
}
