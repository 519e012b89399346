//! Axum handlers for the retrieval HTTP surface.
//!
//! Each handler takes [`AppState`] via [`axum::extract::State`] and returns
//! a [`Json`] body or an [`ApiError`], which axum renders via its
//! [`axum::response::IntoResponse`] impl.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use norma_core::enums::TerritorioTipo;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::search::{build_vector_filter, rank_candidates, resolve_territorio_match, RagRequest};
use crate::state::AppState;

/// `POST /rag/search`
pub async fn search(State(state): State<AppState>, Json(request): Json<RagRequest>) -> Result<Response, ApiError> {
    let (as_of, top_k) = request.validate(&state.config)?;
    let territorio_match = resolve_territorio_match(request.scope, request.ccaa_codigo.as_deref(), request.territorio.as_deref());
    let filter = build_vector_filter(as_of, request.mode, request.include_preambulo, territorio_match.as_ref());

    let query_vector = state.embedder.embed_one(&request.query).await.map_err(ApiError::from)?;
    let candidate_count = state.config.candidate_count(top_k);
    let candidates = state.vector.search_points(&query_vector, Some(filter.clone()), candidate_count).await?;
    let results = rank_candidates(candidates, request.mode, request.min_score, top_k);
    let returned = results.len();

    Ok(Json(json!({
        "query": request.query,
        "asOf": as_of,
        "mode": request.mode,
        "filters": filter,
        "results": results,
        "stats": { "candidates": candidate_count, "returned": returned },
    }))
    .into_response())
}

/// `POST /rag/answer` — same request shape as `/rag/search`; synthesizes a
/// citation-grounded answer from the top results rather than calling an
/// external model (no chat-completion provider is part of this surface).
pub async fn answer(State(state): State<AppState>, Json(request): Json<RagRequest>) -> Result<Response, ApiError> {
    let (as_of, top_k) = request.validate(&state.config)?;
    let territorio_match = resolve_territorio_match(request.scope, request.ccaa_codigo.as_deref(), request.territorio.as_deref());
    let filter = build_vector_filter(as_of, request.mode, request.include_preambulo, territorio_match.as_ref());

    let query_vector = state.embedder.embed_one(&request.query).await.map_err(ApiError::from)?;
    let candidate_count = state.config.candidate_count(top_k);
    let candidates = state.vector.search_points(&query_vector, Some(filter), candidate_count).await?;
    let results = rank_candidates(candidates, request.mode, request.min_score, top_k);

    let used_citations: Vec<String> = results.iter().map(crate::search::SearchResultItem::citation_label).collect();
    let answer_text = if results.is_empty() {
        "No se encontraron unidades vigentes para esta consulta.".to_string()
    } else {
        results.iter().map(|item| item.text.as_str()).collect::<Vec<_>>().join("\n\n")
    };

    Ok(Json(json!({
        "query": request.query,
        "asOf": as_of,
        "mode": request.mode,
        "answer": answer_text,
        "usedCitations": used_citations,
        "results": results,
    }))
    .into_response())
}

/// `GET /rag/unidad/{id_unidad}`
pub async fn get_unidad(State(state): State<AppState>, Path(id_unidad): Path<String>) -> Result<Json<Value>, ApiError> {
    let unidad = state.db.find_unidad(&id_unidad).await?.ok_or_else(|| ApiError::UnidadNotFound(id_unidad.clone()))?;
    Ok(Json(json!(unidad)))
}

/// `GET /rag/catalog/ccaa`
pub async fn catalog_ccaa(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let entries = state.db.list_by_tipo(TerritorioTipo::Autonomico).await?;
    Ok(Json(json!({ "entries": entries })))
}

/// `GET /health` — a reachable database plus a readable object-store root.
pub async fn health(State(state): State<AppState>) -> Response {
    let db_ok = state.db.list_territorios().await.is_ok();
    let store_ok = tokio::fs::metadata(state.store.root()).await.is_ok();
    let healthy = db_ok && store_ok;
    let status = if healthy { axum::http::StatusCode::OK } else { axum::http::StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(json!({ "status": if healthy { "ok" } else { "degraded" }, "db": db_ok, "store": store_ok }))).into_response()
}

/// `GET /pipeline/stats?windowMinutes=`
pub async fn pipeline_stats(State(state): State<AppState>, Query(params): Query<HashMap<String, String>>) -> Result<Json<Value>, ApiError> {
    let window_minutes: i64 = params.get("windowMinutes").and_then(|v| v.parse().ok()).unwrap_or(60);
    let since = Utc::now() - chrono::Duration::minutes(window_minutes);

    let states = state.db.list_all_sync_states().await?;
    let mut by_rollup: HashMap<&'static str, usize> = HashMap::new();
    let mut recently_finished = 0usize;
    for sync_state in &states {
        *by_rollup.entry(sync_state.rollup.as_str()).or_insert(0) += 1;
        if sync_state.last_finished_at.is_some_and(|finished| finished >= since) {
            recently_finished += 1;
        }
    }

    let queue_depths = match &state.queues {
        Some(queues) => json!({
            "sync": queues.sync.depth().await,
            "build": queues.build.depth().await,
            "index": queues.index.depth().await,
        }),
        None => json!({ "sync": 0, "build": 0, "index": 0 }),
    };

    Ok(Json(json!({
        "windowMinutes": window_minutes,
        "totalNorms": states.len(),
        "byRollup": by_rollup,
        "recentlyFinished": recently_finished,
        "queueDepths": queue_depths,
    })))
}
