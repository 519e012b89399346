//! Orchestration: index blocks + per-block version history → candidate
//! semantic units for one norm.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use norma_core::entities::{Unidad, UnidadMetadata};
use norma_core::enums::{BlockKind, UnidadTipo};
use norma_core::ids::content_hash_str;
use norma_parser::bloque_xml::VersionSlice;
use norma_parser::BlockDescriptor;

use crate::anchor::{anchor_set, Anchor};
use crate::classify::{classify, ClassifiedBlock};
use crate::derived::{is_heading_only, unidad_ref};
use crate::filter::{should_keep_semantic_unit, FilterDecision};
use crate::ids::{id_unidad, lineage_key, texto_hash};
use crate::text::{compose, strip_xml_tags};
use crate::tree::{build_tree, unit_root_candidates, TreeNode};
use crate::version_select::select_version;

/// Build every candidate semantic unit for one norm from its index and
/// version history. Units that fail `should_keep_semantic_unit` are
/// omitted. `versions_by_bloque` maps `id_bloque` to that block's version
/// history, as parsed from its bloque-XML document.
#[must_use]
pub fn build_candidates(
    id_norma: &str,
    blocks: &[BlockDescriptor],
    versions_by_bloque: &HashMap<String, Vec<VersionSlice>>,
    metadata: &UnidadMetadata,
    now: DateTime<Utc>,
) -> Vec<Unidad> {
    let classified: Vec<ClassifiedBlock> = blocks.iter().map(classify).collect();
    let nodes = build_tree(classified);
    let empty: Vec<VersionSlice> = Vec::new();

    let mut candidates = Vec::new();

    for root_idx in unit_root_candidates(&nodes) {
        let subtree = collect_subtree(&nodes, root_idx);
        let root = &nodes[root_idx].block;
        let root_versions = versions_by_bloque.get(&root.id_bloque).unwrap_or(&empty);
        let subtree_versions: Vec<VersionSlice> = subtree
            .iter()
            .flat_map(|&i| versions_by_bloque.get(&nodes[i].block.id_bloque).cloned().unwrap_or_default())
            .collect();

        let anchors = anchor_set(root_versions, &subtree_versions);

        for anchor in &anchors {
            if let Some(unidad) = build_one(id_norma, &nodes, root_idx, &subtree, versions_by_bloque, anchor, metadata, now) {
                candidates.push(unidad);
            }
        }
    }

    candidates
}

/// Indices of `root`'s subtree, root first, in document order.
fn collect_subtree(nodes: &[TreeNode], root: usize) -> Vec<usize> {
    let mut out = vec![root];
    let mut frontier = vec![root];
    while let Some(current) = frontier.pop() {
        for &child in &nodes[current].children {
            out.push(child);
            frontier.push(child);
        }
    }
    out.sort_unstable();
    out
}

#[allow(clippy::too_many_arguments)]
fn build_one(
    id_norma: &str,
    nodes: &[TreeNode],
    root_idx: usize,
    subtree: &[usize],
    versions_by_bloque: &HashMap<String, Vec<VersionSlice>>,
    anchor: &Anchor,
    metadata: &UnidadMetadata,
    now: DateTime<Utc>,
) -> Option<Unidad> {
    let root = &nodes[root_idx].block;
    let empty: Vec<VersionSlice> = Vec::new();

    let root_chosen = select_version(versions_by_bloque.get(&root.id_bloque).unwrap_or(&empty), anchor);

    let mut bloques_origen = Vec::new();
    let mut version_hashes = Vec::new();
    let mut parts = Vec::new();
    let mut has_children_with_content = false;

    for &idx in subtree {
        let node = &nodes[idx].block;
        bloques_origen.push(node.id_bloque.clone());
        let chosen = select_version(versions_by_bloque.get(&node.id_bloque).unwrap_or(&empty), anchor);
        let Some(version) = chosen else { continue };
        version_hashes.push(content_hash_str(&version.raw_xml));

        let text = strip_xml_tags(&version.raw_xml);
        if !text.trim().is_empty() {
            if idx != root_idx {
                has_children_with_content = true;
            }
            parts.push(text);
        }
    }

    let header = if root.kind == BlockKind::UnitRoot { Some(root.titulo.as_str()) } else { None };
    let texto_plano = compose(header, &parts);

    let looks_noise = root.kind == BlockKind::Other;
    let decision_tipo = root.unidad_tipo.unwrap_or(UnidadTipo::Otros);
    let decision = should_keep_semantic_unit(decision_tipo, &texto_plano, has_children_with_content, looks_noise);

    let unidad_tipo = match decision {
        FilterDecision::Keep { unidad_tipo } => unidad_tipo,
        FilterDecision::PromoteToOtros => UnidadTipo::Otros,
        FilterDecision::Drop { .. } => return None,
    };

    let titulo_text = if root.titulo.trim().is_empty() { None } else { Some(root.titulo.clone()) };
    let unidad_ref_value = unidad_ref(unidad_tipo, root.titulo.as_str(), &root.id_bloque);
    let lineage = lineage_key(id_norma, unidad_tipo, &unidad_ref_value);
    let hash_texto = texto_hash(&texto_plano);

    let fecha_vigencia_desde = anchor.fecha_vigencia_raw.as_deref().and_then(|raw| norma_parser::dates::parse_wire_any(raw).ok());
    let fecha_publicacion_mod = root_chosen
        .and_then(|v| v.fecha_publicacion_raw.as_deref())
        .and_then(|raw| norma_parser::dates::parse_wire_any(raw).ok());

    let id = id_unidad(
        id_norma,
        unidad_tipo,
        &unidad_ref_value,
        anchor.fecha_vigencia_raw.as_deref(),
        anchor.id_norma_modificadora.as_deref(),
        &hash_texto,
    );

    let heading_only = is_heading_only(unidad_tipo, &texto_plano);

    Some(Unidad {
        id_unidad: id,
        id_norma: id_norma.to_string(),
        unidad_tipo,
        unidad_ref: unidad_ref_value,
        titulo: titulo_text,
        orden: root_idx as i64,
        fecha_vigencia_desde,
        fecha_vigencia_hasta: None,
        fecha_publicacion_mod,
        id_norma_modificadora: anchor.id_norma_modificadora.clone(),
        texto_plano,
        texto_hash: hash_texto,
        source: norma_core::entities::UnidadSource {
            method: "semantic_builder".to_string(),
            bloques_origen,
            indice_hash: None,
            version_hashes,
        },
        metadata: metadata.clone(),
        quality: norma_core::entities::Quality {
            is_heading_only: heading_only,
            skip_retrieval: heading_only,
            reason: String::new(),
        },
        lineage_key: lineage,
        is_latest: false,
        created_at: now,
        last_seen_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, titulo: &str) -> BlockDescriptor {
        BlockDescriptor { id_bloque: id.to_string(), tipo: None, titulo: titulo.to_string(), url: None, fecha_actualizacion_raw: None }
    }

    fn version(vigencia: &str, text: &str) -> VersionSlice {
        VersionSlice {
            fecha_vigencia_raw: Some(vigencia.to_string()),
            fecha_publicacion_raw: Some(vigencia.to_string()),
            id_norma_modificadora: None,
            raw_xml: format!("<version>{text}</version>"),
        }
    }

    #[test]
    fn builds_one_unit_per_anchor() {
        let blocks = vec![
            block("ti", "Título I"),
            block(
                "a1",
                "Artículo 1. Objeto de la ley, que regula de forma extensa y detallada esta materia ampliamente a lo largo de todo el articulado.",
            ),
        ];
        let mut versions = HashMap::new();
        versions.insert(
            "a1".to_string(),
            vec![
                version(
                    "20260101",
                    "Texto original del artículo con suficiente longitud para superar holgadamente el umbral mínimo de caracteres exigido por el filtro de retención.",
                ),
                version(
                    "20260601",
                    "Texto modificado del artículo con suficiente longitud para superar holgadamente el umbral mínimo de caracteres exigido por el filtro de retención.",
                ),
            ],
        );
        let metadata = UnidadMetadata::default();
        let now = DateTime::parse_from_rfc3339("2026-07-01T00:00:00Z").unwrap().with_timezone(&Utc);

        let units = build_candidates("norma_1", &blocks, &versions, &metadata, now);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unidad_tipo, UnidadTipo::Articulo);
        assert!(units[0].texto_plano.contains("Texto original"));
        assert!(units[1].texto_plano.contains("Texto modificado"));
    }

    #[test]
    fn no_version_history_yields_no_anchors_and_no_units() {
        let blocks = vec![block("a1", "Artículo 1")];
        let versions = HashMap::new();
        let metadata = UnidadMetadata::default();
        let now = DateTime::parse_from_rfc3339("2026-07-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let units = build_candidates("norma_1", &blocks, &versions, &metadata, now);
        assert!(units.is_empty());
    }
}
