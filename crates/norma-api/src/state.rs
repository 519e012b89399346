//! Axum router state injected into every handler via [`axum::extract::State`].
//!
//! Cheap to clone — every field is reference-counted, mirroring the shape
//! this pack's other axum adapter uses for its shared state.

use std::sync::Arc;

use norma_db::NormaDb;
use norma_embed::Embedder;
use norma_orchestrator::Queues;
use norma_store::ObjectStore;
use norma_vector::VectorStoreClient;

use crate::config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<NormaDb>,
    pub vector: Arc<VectorStoreClient>,
    pub embedder: Arc<Embedder>,
    pub store: Arc<ObjectStore>,
    pub config: Arc<ApiConfig>,
    /// Set when `norma-api` runs inside the same process as the `pipeline`
    /// binary, so `/pipeline/stats` can report live queue depths. `None`
    /// for a standalone API deployment — stats then report depth `0`.
    pub queues: Option<Arc<Queues>>,
}

impl AppState {
    #[must_use]
    pub fn new(db: NormaDb, vector: VectorStoreClient, embedder: Embedder, store: ObjectStore, config: ApiConfig) -> Self {
        Self {
            db: Arc::new(db),
            vector: Arc::new(vector),
            embedder: Arc::new(embedder),
            store: Arc::new(store),
            config: Arc::new(config),
            queues: None,
        }
    }

    #[must_use]
    pub fn with_queues(mut self, queues: Arc<Queues>) -> Self {
        self.queues = Some(queues);
        self
    }
}
