use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::unidad::UnidadMetadata;
use crate::enums::ChunkMethod;

/// The `(method, size, overlap)` configuration a chunk was produced under.
/// `chunking_hash = H(method, size, overlap)` invalidates chunks when it
/// changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub method: ChunkMethod,
    pub size: usize,
    pub overlap: usize,
}

/// Snapshot of the owning unit's retrieval metadata, copied onto each chunk
/// so the vector payload never needs a join back to `Unidad`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChunkMetadataSnapshot {
    pub unidad_tipo: String,
    pub unidad_ref: String,
    pub titulo: Option<String>,
    pub fecha_vigencia_desde: Option<DateTime<Utc>>,
    pub fecha_vigencia_hasta: Option<DateTime<Utc>>,
    pub metadata: UnidadMetadata,
}

/// A text fragment produced from a unit by the chunk engine, the unit of
/// vector search. `H(id_unidad, chunking_hash, chunk_index, texto_hash)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkSemantico {
    pub id_chunk: String,
    pub id_unidad: String,
    pub id_norma: String,
    pub chunk_index: i64,
    pub texto: String,
    pub texto_hash: String,
    pub chunking_hash: String,
    pub chunking: ChunkingConfig,
    pub metadata: ChunkMetadataSnapshot,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}
