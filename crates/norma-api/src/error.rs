//! Error type for the retrieval HTTP surface, rendered as the `{error,
//! message}` JSON body shape used throughout this handler style.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("query must be at least 3 characters")]
    QueryTooShort,

    #[error("topK must be between 1 and {max}")]
    TopKOutOfRange { max: u32 },

    #[error("scope AUTONOMICO_MAS_ESTATAL requires ccaaCodigo starting with 'CCAA:'")]
    MissingOrInvalidCcaa,

    #[error("unidad {0} not found")]
    UnidadNotFound(String),

    #[error(transparent)]
    Database(#[from] norma_db::error::DatabaseError),

    #[error(transparent)]
    Vector(#[from] norma_vector::VectorError),

    #[error(transparent)]
    Embed(#[from] norma_embed::EmbedError),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::QueryTooShort | Self::TopKOutOfRange { .. } | Self::MissingOrInvalidCcaa => StatusCode::BAD_REQUEST,
            Self::UnidadNotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Vector(_) | Self::Embed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::QueryTooShort => "query_too_short",
            Self::TopKOutOfRange { .. } => "top_k_out_of_range",
            Self::MissingOrInvalidCcaa => "missing_or_invalid_ccaa",
            Self::UnidadNotFound(_) => "unidad_not_found",
            Self::Database(_) => "database_error",
            Self::Vector(_) => "vector_store_error",
            Self::Embed(_) => "embedder_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::warn!(error = %self, code = self.code(), "rag request failed");
        }
        (self.status(), Json(json!({ "error": self.code(), "message": self.to_string() }))).into_response()
    }
}
