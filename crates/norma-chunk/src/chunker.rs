//! Entry point: split one unit's text into `ChunkSemantico` rows (spec
//! §4.7 end to end), given the unit's metadata snapshot.

use chrono::{DateTime, Utc};
use norma_core::entities::{ChunkMetadataSnapshot, ChunkSemantico, ChunkingConfig, Unidad};
use norma_core::enums::{ChunkMethod, UnidadTipo};
use norma_core::ids::{compose_id, content_hash_str, PREFIX_CHUNK};

use crate::config::ChunkConfig;
use crate::heading::is_heading_only_chunk;
use crate::normalize::normalize_chunk_text;
use crate::recursive::split_recursive;
use crate::simple::split_simple;

/// Split `unit.texto_plano` into chunks per `config`, applying the
/// ARTICULO short-circuit, per-chunk normalization, and heading-only chunk
/// filtering, then assembling `ChunkSemantico` rows with deterministic ids.
#[must_use]
pub fn build_chunks_for_unit(unit: &Unidad, config: ChunkConfig, now: DateTime<Utc>) -> Vec<ChunkSemantico> {
    let raw_pieces = if unit.unidad_tipo == UnidadTipo::Articulo && unit.texto_plano.chars().count() <= config.chunk_size {
        vec![unit.texto_plano.clone()]
    } else {
        match config.method {
            ChunkMethod::Simple => split_simple(&unit.texto_plano, config.chunk_size, config.overlap),
            ChunkMethod::Recursive => split_recursive(&unit.texto_plano, config.chunk_size, config.overlap),
        }
    };

    let is_articulo = unit.unidad_tipo == UnidadTipo::Articulo;
    let chunking_hash = config.chunking_hash();
    let metadata_snapshot = ChunkMetadataSnapshot {
        unidad_tipo: unit.unidad_tipo.as_str().to_string(),
        unidad_ref: unit.unidad_ref.clone(),
        titulo: unit.titulo.clone(),
        fecha_vigencia_desde: unit.fecha_vigencia_desde,
        fecha_vigencia_hasta: unit.fecha_vigencia_hasta,
        metadata: unit.metadata.clone(),
    };

    let chunking = ChunkingConfig { method: config.method, size: config.chunk_size, overlap: config.overlap };

    let mut chunks = Vec::new();
    let mut chunk_index = 0i64;

    for piece in raw_pieces {
        let normalized = normalize_chunk_text(&piece);
        if normalized.is_empty() {
            continue;
        }
        let applicable_to_heading_check = matches!(
            unit.unidad_tipo,
            UnidadTipo::Articulo | UnidadTipo::DisposicionAdicional | UnidadTipo::DisposicionTransitoria | UnidadTipo::DisposicionFinal
        );
        if applicable_to_heading_check && is_heading_only_chunk(is_articulo, &normalized) {
            continue;
        }

        let texto_hash = content_hash_str(&normalized);
        let id_chunk = compose_id(
            PREFIX_CHUNK,
            &[&unit.id_unidad, &chunking_hash, &chunk_index.to_string(), &texto_hash],
        );

        chunks.push(ChunkSemantico {
            id_chunk,
            id_unidad: unit.id_unidad.clone(),
            id_norma: unit.id_norma.clone(),
            chunk_index,
            texto: normalized,
            texto_hash,
            chunking_hash: chunking_hash.clone(),
            chunking,
            metadata: metadata_snapshot.clone(),
            created_at: now,
            last_seen_at: now,
        });
        chunk_index += 1;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use norma_core::entities::{Quality, UnidadMetadata, UnidadSource};

    fn unit(texto_plano: &str, unidad_tipo: UnidadTipo) -> Unidad {
        let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2026-07-01T00:00:00Z").unwrap().with_timezone(&Utc);
        Unidad {
            id_unidad: "uni_abc".to_string(),
            id_norma: "norma_1".to_string(),
            unidad_tipo,
            unidad_ref: "Art. 1".to_string(),
            titulo: Some("Artículo 1".to_string()),
            orden: 0,
            fecha_vigencia_desde: None,
            fecha_vigencia_hasta: None,
            fecha_publicacion_mod: None,
            id_norma_modificadora: None,
            texto_plano: texto_plano.to_string(),
            texto_hash: "hash".to_string(),
            source: UnidadSource::default(),
            metadata: UnidadMetadata::default(),
            quality: Quality::default(),
            lineage_key: "lineage".to_string(),
            is_latest: true,
            created_at: now,
            last_seen_at: now,
        }
    }

    #[test]
    fn articulo_under_chunk_size_bypasses_splitter() {
        let text = "Artículo 1. Objeto.\n\nTexto breve.";
        let u = unit(text, UnidadTipo::Articulo);
        let config = ChunkConfig { method: ChunkMethod::Recursive, chunk_size: 1000, overlap: 100 };
        let now = DateTime::parse_from_rfc3339("2026-07-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let chunks = build_chunks_for_unit(&u, config, now);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].texto.contains("Texto breve"));
    }

    #[test]
    fn non_articulo_splits_normally() {
        let text = "x".repeat(50) + "\n\n" + &"y".repeat(50);
        let u = unit(&text, UnidadTipo::Anexo);
        let config = ChunkConfig { method: ChunkMethod::Recursive, chunk_size: 60, overlap: 0 };
        let now = DateTime::parse_from_rfc3339("2026-07-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let chunks = build_chunks_for_unit(&u, config, now);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
    }
}
