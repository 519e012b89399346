//! # norma-api
//!
//! Thin axum retrieval HTTP surface: `/rag/search`, `/rag/answer`,
//! `/rag/unidad/:id`, `/rag/catalog/ccaa`, `/health`, `/pipeline/stats`.
//! No ingestion write path lives here — this crate only
//! reads from [`norma_db`] and [`norma_vector`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod search;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;

/// Bind and serve the router until the process is asked to shut down.
///
/// # Errors
///
/// Returns an error if the bind address can't be listened on or the server
/// loop itself fails.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "norma-api listening");
    axum::serve(listener, router).await?;
    Ok(())
}
