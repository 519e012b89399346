//! Derived-key composition for semantic units.
//!
//! `Option`-typed inputs whose id formula must tell apart from
//! "present but empty" (`fecha_vigencia_desde`, `id_norma_modificadora`) are
//! passed through as the sentinel `"\0"` rather than `""`, since a norm's
//! own id or a date token is never empty but can legitimately be absent.

use norma_core::ids::{compose_hash, compose_id, PREFIX_UNIDAD};
use norma_core::enums::UnidadTipo;

const ABSENT: &str = "\0";

fn or_absent(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT)
}

/// `lineage_key = H(id_norma, unidad_tipo, unidad_ref)`.
#[must_use]
pub fn lineage_key(id_norma: &str, unidad_tipo: UnidadTipo, unidad_ref: &str) -> String {
    compose_hash(&[id_norma, unidad_tipo.as_str(), unidad_ref])
}

/// `texto_hash = H(normalized text)`.
#[must_use]
pub fn texto_hash(normalized_text: &str) -> String {
    compose_hash(&[normalized_text])
}

/// `id_unidad = H(id_norma, unidad_tipo, unidad_ref, vigencia_desde_iso|"",
/// id_norma_modificadora|"", texto_hash)`.
#[must_use]
pub fn id_unidad(
    id_norma: &str,
    unidad_tipo: UnidadTipo,
    unidad_ref: &str,
    vigencia_desde_iso: Option<&str>,
    id_norma_modificadora: Option<&str>,
    texto_hash: &str,
) -> String {
    compose_id(
        PREFIX_UNIDAD,
        &[
            id_norma,
            unidad_tipo.as_str(),
            unidad_ref,
            or_absent(vigencia_desde_iso),
            or_absent(id_norma_modificadora),
            texto_hash,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineage_key_is_stable_across_anchors() {
        let a = lineage_key("norma_x", UnidadTipo::Articulo, "Art. 12");
        let b = lineage_key("norma_x", UnidadTipo::Articulo, "Art. 12");
        assert_eq!(a, b);
    }

    #[test]
    fn id_unidad_distinguishes_absent_from_empty_vigencia() {
        let a = id_unidad("norma_x", UnidadTipo::Articulo, "Art. 12", None, None, "hash");
        let b = id_unidad("norma_x", UnidadTipo::Articulo, "Art. 12", Some(""), None, "hash");
        assert_ne!(a, b);
    }

    #[test]
    fn id_unidad_changes_with_anchor() {
        let a = id_unidad("norma_x", UnidadTipo::Articulo, "Art. 12", Some("2026-01-01"), None, "hash");
        let b = id_unidad("norma_x", UnidadTipo::Articulo, "Art. 12", Some("2026-02-01"), None, "hash");
        assert_ne!(a, b);
    }
}
