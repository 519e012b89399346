//! Cross-cutting error types.
//!
//! Crates that own I/O or parsing define their own error enum (`StoreError`,
//! `DatabaseError`, `ParseError`, ...); this one is for errors that can
//! originate anywhere and don't belong to a specific layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A stage transition was attempted that the state machine forbids.
    #[error("invalid stage transition: {id_norma} stage {stage} from {from} to {to}")]
    InvalidTransition {
        id_norma: String,
        stage: String,
        from: String,
        to: String,
    },

    /// Data failed validation (shape, format, constraints).
    #[error("validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
