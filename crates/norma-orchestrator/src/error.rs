//! Error type for norma-orchestrator.

use thiserror::Error;

/// Errors raised while running a stage job or a seed pass.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Database(#[from] norma_db::error::DatabaseError),

    #[error(transparent)]
    Source(#[from] norma_source::SourceError),

    #[error(transparent)]
    Parser(#[from] norma_parser::ParserError),

    #[error(transparent)]
    Store(#[from] norma_store::StoreError),

    #[error(transparent)]
    Semantic(#[from] norma_semantic::SemanticError),

    #[error(transparent)]
    Chunk(#[from] norma_chunk::ChunkError),

    #[error(transparent)]
    Vector(#[from] norma_vector::VectorError),

    /// A stage's input couldn't be reconstructed from what earlier stages
    /// persisted (e.g. a version's object-store file is missing).
    #[error("stage input error for {id_norma}: {message}")]
    MissingInput { id_norma: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
