//! Canonical vector point payload and the deterministic point id
//! derived from a chunk's id.

use norma_core::entities::ChunkSemantico;
use norma_core::ids::content_hash_str;
use serde::{Deserialize, Serialize};

/// `null` `fecha_vigencia_hasta` is mirrored into the vector payload as this
/// sentinel (max representable millisecond) so a single numeric range
/// predicate covers both open and closed intervals.
pub const VIGENCIA_HASTA_SENTINEL_MS: i64 = 253_402_300_799_000;

/// The fields of a point payload the cleanup pass compares against the
/// incoming chunk to decide whether a re-embed is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFingerprint {
    pub id_norma: String,
    pub id_unidad: String,
    pub texto_hash: String,
    pub chunking_hash: String,
    pub vigencia_desde: i64,
    pub vigencia_hasta: i64,
}

/// The canonical point payload upserted into the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    pub chunk_id: String,
    pub id_norma: String,
    pub id_unidad: String,
    pub unidad_tipo: String,
    pub unidad_ref: String,
    pub titulo: Option<String>,
    pub territorio_codigo: Option<String>,
    pub territorio_tipo: Option<String>,
    pub territorio_nombre: Option<String>,
    pub vigencia_desde: i64,
    pub vigencia_hasta: i64,
    pub url_html_consolidada: Option<String>,
    pub url_eli: Option<String>,
    pub tags: Vec<String>,
    pub text: String,
    pub texto_hash: String,
    pub chunking_hash: String,
}

impl PointPayload {
    /// Build the canonical payload for one chunk. `vigencia_desde` falls
    /// back to 0 (epoch) and `vigencia_hasta` to [`VIGENCIA_HASTA_SENTINEL_MS`]
    /// when the owning unit has no bound on that side.
    #[must_use]
    pub fn from_chunk(chunk: &ChunkSemantico) -> Self {
        let vigencia_desde = chunk.metadata.fecha_vigencia_desde.map_or(0, |dt| dt.timestamp_millis());
        let vigencia_hasta = chunk.metadata.fecha_vigencia_hasta.map_or(VIGENCIA_HASTA_SENTINEL_MS, |dt| dt.timestamp_millis());

        Self {
            chunk_id: chunk.id_chunk.clone(),
            id_norma: chunk.id_norma.clone(),
            id_unidad: chunk.id_unidad.clone(),
            unidad_tipo: chunk.metadata.unidad_tipo.clone(),
            unidad_ref: chunk.metadata.unidad_ref.clone(),
            titulo: chunk.metadata.titulo.clone(),
            territorio_codigo: chunk.metadata.metadata.territorio_codigo.clone(),
            territorio_tipo: chunk.metadata.metadata.territorio_tipo.clone(),
            territorio_nombre: chunk.metadata.metadata.territorio_nombre.clone(),
            vigencia_desde,
            vigencia_hasta,
            url_html_consolidada: chunk.metadata.metadata.url_html_consolidada.clone(),
            url_eli: chunk.metadata.metadata.url_eli.clone(),
            tags: chunk.metadata.metadata.tags.clone(),
            text: chunk.texto.clone(),
            texto_hash: chunk.texto_hash.clone(),
            chunking_hash: chunk.chunking_hash.clone(),
        }
    }

    #[must_use]
    pub fn fingerprint(&self) -> PayloadFingerprint {
        PayloadFingerprint {
            id_norma: self.id_norma.clone(),
            id_unidad: self.id_unidad.clone(),
            texto_hash: self.texto_hash.clone(),
            chunking_hash: self.chunking_hash.clone(),
            vigencia_desde: self.vigencia_desde,
            vigencia_hasta: self.vigencia_hasta,
        }
    }
}

/// Derive the deterministic 8-4-4-4-12 point id for a chunk id: hash the
/// chunk id, take the first 32 hex characters, and format as a UUID.
#[must_use]
pub fn point_id_for_chunk(id_chunk: &str) -> String {
    let hash = content_hash_str(id_chunk);
    let hex = &hash[..32];
    format!("{}-{}-{}-{}-{}", &hex[0..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..32])
}

#[cfg(test)]
mod tests {
    use norma_core::entities::ChunkMetadataSnapshot;
    use norma_core::enums::ChunkMethod;

    use super::*;

    fn sample_chunk() -> ChunkSemantico {
        let now = chrono::Utc::now();
        ChunkSemantico {
            id_chunk: "chunk_abcdef0123456789abcdef0123456789".to_string(),
            id_unidad: "uni_1".to_string(),
            id_norma: "BOE-A-1".to_string(),
            chunk_index: 0,
            texto: "texto".to_string(),
            texto_hash: "th".to_string(),
            chunking_hash: "ch".to_string(),
            chunking: norma_core::entities::ChunkingConfig { method: ChunkMethod::Simple, size: 1000, overlap: 0 },
            metadata: ChunkMetadataSnapshot {
                unidad_tipo: "ARTICULO".to_string(),
                unidad_ref: "Art. 1".to_string(),
                titulo: Some("Artículo 1".to_string()),
                fecha_vigencia_desde: None,
                fecha_vigencia_hasta: None,
                metadata: Default::default(),
            },
            created_at: now,
            last_seen_at: now,
        }
    }

    #[test]
    fn maps_null_vigencia_to_epoch_and_sentinel() {
        let payload = PointPayload::from_chunk(&sample_chunk());
        assert_eq!(payload.vigencia_desde, 0);
        assert_eq!(payload.vigencia_hasta, VIGENCIA_HASTA_SENTINEL_MS);
    }

    #[test]
    fn point_id_is_deterministic_and_uuid_shaped() {
        let id1 = point_id_for_chunk("chunk_abc");
        let id2 = point_id_for_chunk("chunk_abc");
        assert_eq!(id1, id2);
        let parts: Vec<&str> = id1.split('-').collect();
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![8, 4, 4, 4, 12]);
    }

    #[test]
    fn point_id_differs_for_different_chunks() {
        assert_ne!(point_id_for_chunk("chunk_a"), point_id_for_chunk("chunk_b"));
    }

    #[test]
    fn fingerprint_matches_equal_payloads() {
        let payload = PointPayload::from_chunk(&sample_chunk());
        let fp1 = payload.fingerprint();
        let fp2 = PointPayload::from_chunk(&sample_chunk()).fingerprint();
        assert_eq!(fp1, fp2);
    }
}
