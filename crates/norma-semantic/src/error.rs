//! Error type for norma-semantic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("block {id_bloque} has no classifiable content")]
    UnclassifiableBlock { id_bloque: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
