//! Per-norm post-processing.

use std::collections::HashMap;

use norma_core::entities::Unidad;

/// Deduplicate candidate units by `id_unidad`, keeping the first occurrence,
/// then mark exactly one unit per `lineage_key` as `is_latest`: the one with
/// the greatest `(fecha_vigencia_desde, fecha_publicacion_mod, id_unidad)`.
#[must_use]
pub fn finalize(candidates: Vec<Unidad>) -> Vec<Unidad> {
    let mut seen_ids = std::collections::HashSet::new();
    let mut deduped: Vec<Unidad> = Vec::new();
    for unidad in candidates {
        if seen_ids.insert(unidad.id_unidad.clone()) {
            deduped.push(unidad);
        }
    }

    let mut winner_by_lineage: HashMap<String, usize> = HashMap::new();
    for (i, unidad) in deduped.iter().enumerate() {
        winner_by_lineage
            .entry(unidad.lineage_key.clone())
            .and_modify(|best| {
                if unidad.ordering_key() > deduped[*best].ordering_key() {
                    *best = i;
                }
            })
            .or_insert(i);
    }

    let winners: std::collections::HashSet<usize> = winner_by_lineage.into_values().collect();
    for (i, unidad) in deduped.iter_mut().enumerate() {
        unidad.is_latest = winners.contains(&i);
    }

    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use norma_core::entities::{Quality, UnidadMetadata, UnidadSource};
    use norma_core::enums::UnidadTipo;

    fn unidad(id: &str, lineage: &str, desde: Option<&str>) -> Unidad {
        let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2026-07-01T00:00:00Z").unwrap().with_timezone(&Utc);
        Unidad {
            id_unidad: id.to_string(),
            id_norma: "norma_1".to_string(),
            unidad_tipo: UnidadTipo::Articulo,
            unidad_ref: "Art. 1".to_string(),
            titulo: None,
            orden: 0,
            fecha_vigencia_desde: desde.map(|d| DateTime::parse_from_rfc3339(d).unwrap().with_timezone(&Utc)),
            fecha_vigencia_hasta: None,
            fecha_publicacion_mod: None,
            id_norma_modificadora: None,
            texto_plano: "texto".to_string(),
            texto_hash: "hash".to_string(),
            source: UnidadSource::default(),
            metadata: UnidadMetadata::default(),
            quality: Quality::default(),
            lineage_key: lineage.to_string(),
            is_latest: false,
            created_at: now,
            last_seen_at: now,
        }
    }

    #[test]
    fn dedups_by_id_keeping_first() {
        let units = vec![unidad("u1", "l1", None), unidad("u1", "l1", None)];
        let out = finalize(units);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn marks_latest_per_lineage() {
        let units = vec![
            unidad("u1", "l1", Some("2026-01-01T00:00:00Z")),
            unidad("u2", "l1", Some("2026-06-01T00:00:00Z")),
            unidad("u3", "l2", Some("2026-01-01T00:00:00Z")),
        ];
        let out = finalize(units);
        let by_id: HashMap<&str, &Unidad> = out.iter().map(|u| (u.id_unidad.as_str(), u)).collect();
        assert!(!by_id["u1"].is_latest);
        assert!(by_id["u2"].is_latest);
        assert!(by_id["u3"].is_latest);
    }
}
