//! Conversions from [`norma_config::NormaConfig`] into the runtime structs
//! each pipeline crate actually takes, and the handful of "open everything"
//! helpers every binary needs before it can do real work.

use norma_config::NormaConfig;
use norma_db::NormaDb;
use norma_embed::config::{BackendConfig, EmbedderConfig};
use norma_embed::Embedder;
use norma_orchestrator::config::{OrchestratorConfig, RateLimit as OrchestratorRateLimit};
use norma_source::config::SourceClientConfig;
use norma_source::SourceClient;
use norma_store::ObjectStore;
use norma_vector::config::VectorStoreConfig;
use norma_vector::VectorStoreClient;

/// Open (or create) the database named by `config.storage`, following a
/// remote replica if one is configured.
///
/// # Errors
///
/// Returns an error if the database can't be opened or migrated.
pub async fn open_db(config: &NormaConfig) -> anyhow::Result<NormaDb> {
    let storage = &config.storage;
    let db = match (&storage.db_remote_url, &storage.db_auth_token) {
        (Some(remote_url), Some(auth_token)) => NormaDb::open_synced(&storage.db_path, remote_url, auth_token).await?,
        _ => NormaDb::open_local(&storage.db_path).await?,
    };
    Ok(db)
}

#[must_use]
pub fn object_store(config: &NormaConfig) -> ObjectStore {
    ObjectStore::new(config.storage.storage_root.clone())
}

#[must_use]
pub fn source_client(config: &NormaConfig) -> SourceClient {
    let source_config = SourceClientConfig::new(config.source.trimmed_base())
        .with_timeout_ms(config.http.timeout_ms)
        .with_retries(config.http.retry_count, config.http.retry_backoff_ms);
    SourceClient::new(source_config)
}

#[must_use]
pub fn vector_client(config: &NormaConfig) -> VectorStoreClient {
    let vector_config = VectorStoreConfig::new(config.vector.base_url.clone(), config.vector.collection.clone());
    VectorStoreClient::new(vector_config)
}

fn backend_for(provider: norma_config::embeddings::EmbeddingsProvider, embeddings: &norma_config::EmbeddingsConfig) -> BackendConfig {
    use norma_config::embeddings::EmbeddingsProvider;
    match provider {
        EmbeddingsProvider::Local => BackendConfig::local(embeddings.local_embeddings_url.clone(), embeddings.model.clone())
            .with_timeout_ms(embeddings.timeout_ms),
        EmbeddingsProvider::Openai => {
            BackendConfig::openai(embeddings.model.clone(), embeddings.api_key.clone()).with_timeout_ms(embeddings.timeout_ms)
        }
    }
}

#[must_use]
pub fn embedder(config: &NormaConfig) -> Embedder {
    let embeddings = &config.embeddings;
    let mut embedder_config = EmbedderConfig::new(backend_for(embeddings.provider, embeddings));
    if let Some(fallback_provider) = embeddings.fallback_provider {
        embedder_config = embedder_config.with_fallback(backend_for(fallback_provider, embeddings));
    }
    Embedder::new(embedder_config)
}

#[must_use]
pub fn orchestrator_config(config: &NormaConfig) -> OrchestratorConfig {
    let pipeline = &config.pipeline;
    let to_rate_limit = |rate: &norma_config::pipeline::RateLimit| OrchestratorRateLimit {
        max: rate.max,
        duration_ms: rate.duration_ms,
    };
    OrchestratorConfig {
        sync_concurrency: pipeline.sync_concurrency,
        build_concurrency: pipeline.build_concurrency,
        index_concurrency: pipeline.index_concurrency,
        orchestrator_concurrency: pipeline.orchestrator_concurrency,
        sync_rate_limit: to_rate_limit(&pipeline.sync_rate_limit),
        build_rate_limit: to_rate_limit(&pipeline.build_rate_limit),
        index_rate_limit: to_rate_limit(&pipeline.index_rate_limit),
        normalize_territory: config.general.normalize_territory,
        store_raw_snapshots: config.general.store_raw_snapshots,
        storage_root: config.storage.storage_root.clone(),
        chunk_method: config.chunk.method,
        chunk_size: config.chunk.size,
        chunk_overlap: config.chunk.overlap,
        backpressure_poll_ms: 1_000,
    }
}

#[must_use]
pub fn api_config(config: &NormaConfig) -> norma_api::ApiConfig {
    norma_api::ApiConfig {
        bind_addr: config.api.bind_addr.clone(),
        default_top_k: config.api.default_top_k,
        max_top_k: config.api.max_top_k,
        default_min_score: config.api.default_min_score,
        max_candidates: config.api.max_candidates,
        candidate_multiplier: config.api.candidate_multiplier,
    }
}

/// Build a [`norma_orchestrator::StageContext`] from a loaded config,
/// opening the database, source client, object store, embedder, and vector
/// store it needs.
///
/// # Errors
///
/// Returns an error if the database can't be opened.
pub async fn stage_context(config: &NormaConfig) -> anyhow::Result<norma_orchestrator::StageContext> {
    Ok(norma_orchestrator::StageContext {
        db: open_db(config).await?,
        source: source_client(config),
        store: object_store(config),
        embedder: embedder(config),
        vector: vector_client(config),
        config: orchestrator_config(config),
    })
}
