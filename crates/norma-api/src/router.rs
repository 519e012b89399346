//! Router assembly.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/rag/search", post(handlers::search))
        .route("/rag/answer", post(handlers::answer))
        .route("/rag/unidad/{id_unidad}", get(handlers::get_unidad))
        .route("/rag/catalog/ccaa", get(handlers::catalog_ccaa))
        .route("/health", get(handlers::health))
        .route("/pipeline/stats", get(handlers::pipeline_stats))
        .with_state(state)
}
