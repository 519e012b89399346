//! Version selection for an anchor.
//!
//! For each node in a root's subtree, pick the one version that represents
//! that node as of a given anchor: exact match first, then the latest
//! version not newer than the anchor, then the globally latest as a last
//! resort.

use crate::anchor::Anchor;
use norma_parser::bloque_xml::VersionSlice;

/// Tie-break order used whenever more than one version qualifies:
/// `(vigencia, publication, id)`, ascending, so `.last()` is "latest".
fn sort_key(v: &VersionSlice) -> (&str, &str, &str) {
    (
        v.fecha_vigencia_raw.as_deref().unwrap_or(""),
        v.fecha_publicacion_raw.as_deref().unwrap_or(""),
        v.id_norma_modificadora.as_deref().unwrap_or(""),
    )
}

/// Select the version of `versions` (all belonging to one node) that
/// applies at `anchor`.
#[must_use]
pub fn select_version<'a>(versions: &'a [VersionSlice], anchor: &Anchor) -> Option<&'a VersionSlice> {
    if versions.is_empty() {
        return None;
    }

    if let Some(exact) = versions.iter().find(|v| {
        v.fecha_vigencia_raw == anchor.fecha_vigencia_raw && v.id_norma_modificadora == anchor.id_norma_modificadora
    }) {
        return Some(exact);
    }

    if let Some(anchor_vigencia) = anchor.fecha_vigencia_raw.as_deref() {
        let mut candidates: Vec<&VersionSlice> = versions
            .iter()
            .filter(|v| v.fecha_vigencia_raw.as_deref().is_some_and(|d| d <= anchor_vigencia))
            .collect();
        candidates.sort_by_key(|v| sort_key(v));
        if let Some(latest) = candidates.last() {
            return Some(latest);
        }
    }

    let mut all: Vec<&VersionSlice> = versions.iter().collect();
    all.sort_by_key(|v| sort_key(v));
    all.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(vigencia: &str, publicacion: &str, modificadora: Option<&str>) -> VersionSlice {
        VersionSlice {
            fecha_vigencia_raw: Some(vigencia.to_string()),
            fecha_publicacion_raw: Some(publicacion.to_string()),
            id_norma_modificadora: modificadora.map(str::to_string),
            raw_xml: String::new(),
        }
    }

    #[test]
    fn exact_match_wins() {
        let versions = vec![version("20260101", "20251201", Some("A")), version("20260201", "20260101", Some("B"))];
        let anchor = Anchor { fecha_vigencia_raw: Some("20260201".into()), id_norma_modificadora: Some("B".into()) };
        let chosen = select_version(&versions, &anchor).unwrap();
        assert_eq!(chosen.id_norma_modificadora.as_deref(), Some("B"));
    }

    #[test]
    fn falls_back_to_latest_at_or_before_anchor() {
        let versions = vec![version("20260101", "20251201", None), version("20260301", "20260201", None)];
        let anchor = Anchor { fecha_vigencia_raw: Some("20260215".into()), id_norma_modificadora: Some("X".into()) };
        let chosen = select_version(&versions, &anchor).unwrap();
        assert_eq!(chosen.fecha_vigencia_raw.as_deref(), Some("20260101"));
    }

    #[test]
    fn falls_back_to_globally_latest_when_none_precede_anchor() {
        let versions = vec![version("20260301", "20260201", None)];
        let anchor = Anchor { fecha_vigencia_raw: Some("20260101".into()), id_norma_modificadora: None };
        let chosen = select_version(&versions, &anchor).unwrap();
        assert_eq!(chosen.fecha_vigencia_raw.as_deref(), Some("20260301"));
    }

    #[test]
    fn no_versions_selects_none() {
        assert!(select_version(&[], &Anchor { fecha_vigencia_raw: None, id_norma_modificadora: None }).is_none());
    }
}
