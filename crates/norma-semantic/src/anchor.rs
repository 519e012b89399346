//! Anchor-set computation.
//!
//! An anchor is a `(fecha_vigencia_desde, id_norma_modificadora)` pair. Each
//! anchor seen across a root's versions (or, failing that, across its whole
//! subtree) produces one semantic unit for that root. Anchors are processed
//! oldest-first so `is_latest` bookkeeping downstream sees a stable order.

use norma_parser::bloque_xml::VersionSlice;

/// One point in a root's temporal evolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub fecha_vigencia_raw: Option<String>,
    pub id_norma_modificadora: Option<String>,
}

/// Compute the anchor set for a root node from its own versions, falling
/// back to the subtree's versions when the root carries none.
#[must_use]
pub fn anchor_set<'a>(
    root_versions: &'a [VersionSlice],
    subtree_versions: &'a [VersionSlice],
) -> Vec<Anchor> {
    let source: &[VersionSlice] = if root_versions.is_empty() { subtree_versions } else { root_versions };

    let mut seen = Vec::new();
    for v in source {
        let anchor = Anchor {
            fecha_vigencia_raw: v.fecha_vigencia_raw.clone(),
            id_norma_modificadora: v.id_norma_modificadora.clone(),
        };
        if !seen.contains(&anchor) {
            seen.push(anchor);
        }
    }

    seen.sort_by(|a, b| a.fecha_vigencia_raw.cmp(&b.fecha_vigencia_raw));
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(vigencia: &str, modificadora: Option<&str>) -> VersionSlice {
        VersionSlice {
            fecha_vigencia_raw: Some(vigencia.to_string()),
            fecha_publicacion_raw: None,
            id_norma_modificadora: modificadora.map(str::to_string),
            raw_xml: String::new(),
        }
    }

    #[test]
    fn dedups_identical_pairs() {
        let versions = vec![version("20260101", None), version("20260101", None)];
        let anchors = anchor_set(&versions, &[]);
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn sorts_ascending_by_vigencia() {
        let versions = vec![version("20260301", None), version("20260101", None)];
        let anchors = anchor_set(&versions, &[]);
        assert_eq!(anchors[0].fecha_vigencia_raw.as_deref(), Some("20260101"));
        assert_eq!(anchors[1].fecha_vigencia_raw.as_deref(), Some("20260301"));
    }

    #[test]
    fn falls_back_to_subtree_when_root_has_no_versions() {
        let subtree = vec![version("20260101", Some("BOE-A-X"))];
        let anchors = anchor_set(&[], &subtree);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].id_norma_modificadora.as_deref(), Some("BOE-A-X"));
    }

    #[test]
    fn distinguishes_by_modifier() {
        let versions = vec![version("20260101", Some("A")), version("20260101", Some("B"))];
        let anchors = anchor_set(&versions, &[]);
        assert_eq!(anchors.len(), 2);
    }
}
