//! Deterministic id composition and content hashing.
//!
//! Every entity id in this pipeline is `H(inputs...)` — same inputs, same id;
//! changing any input changes the output. We hash each
//! part length-prefixed so `("ab", "c")` and `("a", "bc")` never collide.

use sha2::{Digest, Sha256};

/// Id prefixes, one per entity, purely for readability when an id shows up
/// in a log line or a file path — they carry no semantic weight.
pub const PREFIX_NORMA: &str = "norma";
pub const PREFIX_INDICE: &str = "idx";
pub const PREFIX_BLOQUE: &str = "blq";
pub const PREFIX_VERSION: &str = "ver";
pub const PREFIX_UNIDAD: &str = "uni";
pub const PREFIX_CHUNK: &str = "chk";

/// Sha256 hex digest of arbitrary bytes (used for `hash_xml`, `hash_pretty`,
/// `texto_hash`).
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Convenience wrapper over [`content_hash`] for UTF-8 text.
#[must_use]
pub fn content_hash_str(text: &str) -> String {
    content_hash(text.as_bytes())
}

/// First 8 hex chars of a content hash, used in object-store file names.
#[must_use]
pub fn short_hash8(hash_hex: &str) -> &str {
    &hash_hex[..hash_hex.len().min(8)]
}

/// Hash a sequence of length-prefixed parts into a hex digest, with no id
/// prefix attached. Used for `lineage_key`, `chunking_hash`, and other
/// derived keys that are not themselves an entity id.
#[must_use]
pub fn compose_hash(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Hash a sequence of length-prefixed parts into a prefixed entity id.
///
/// `parts` should list every input that feeds that id's identity, in order,
/// with `Option`-typed inputs passed through as `""` by the caller so that
/// "absent" and "empty string" are distinguishable only by the caller's own
/// convention (callers use a sentinel like `"\0"` for genuinely-absent
/// fields that must stay distinguishable from an empty one — see
/// `norma-semantic::ids` for `id_unidad`).
#[must_use]
pub fn compose_id(prefix: &str, parts: &[&str]) -> String {
    let digest = compose_hash(parts);
    format!("{prefix}_{}", &digest[..32])
}

const ABSENT: &str = "\0";

fn or_absent(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT)
}

/// `id_indice = H(id_norma, fecha_actualizacion_raw, hash_xml)`.
#[must_use]
pub fn id_indice(id_norma: &str, fecha_actualizacion_raw: Option<&str>, hash_xml: &str) -> String {
    compose_id(PREFIX_INDICE, &[id_norma, or_absent(fecha_actualizacion_raw), hash_xml])
}

/// `id_bloque_row = H(id_norma, id_bloque)` — the row id for a block,
/// distinct from `id_bloque`, the source's own block identifier.
#[must_use]
pub fn id_bloque_row(id_norma: &str, id_bloque: &str) -> String {
    compose_id(PREFIX_BLOQUE, &[id_norma, id_bloque])
}

/// `id_version = H(id_norma, id_bloque, fecha_vigencia_raw, id_norma_modificadora, hash_xml)`.
///
/// `id_norma_modificadora` is `Option`-typed and passed through the same
/// absent-vs-empty sentinel convention as `norma-semantic::ids::id_unidad`.
#[must_use]
pub fn id_version(
    id_norma: &str,
    id_bloque: &str,
    fecha_vigencia_raw: &str,
    id_norma_modificadora: Option<&str>,
    hash_xml: &str,
) -> String {
    compose_id(
        PREFIX_VERSION,
        &[id_norma, id_bloque, fecha_vigencia_raw, or_absent(id_norma_modificadora), hash_xml],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_version_distinguishes_absent_from_empty_modificadora() {
        let a = id_version("n", "b", "2026-01-01", None, "h");
        let b = id_version("n", "b", "2026-01-01", Some(""), "h");
        assert_ne!(a, b);
    }

    #[test]
    fn id_version_changes_with_hash() {
        let a = id_version("n", "b", "2026-01-01", None, "h1");
        let b = id_version("n", "b", "2026-01-01", None, "h2");
        assert_ne!(a, b);
    }

    #[test]
    fn compose_id_is_pure() {
        let a = compose_id(PREFIX_NORMA, &["a", "b"]);
        let b = compose_id(PREFIX_NORMA, &["a", "b"]);
        assert_eq!(a, b);
    }

    #[test]
    fn compose_id_changes_with_input() {
        let a = compose_id(PREFIX_NORMA, &["a", "b"]);
        let b = compose_id(PREFIX_NORMA, &["a", "c"]);
        assert_ne!(a, b);
    }

    #[test]
    fn compose_id_is_not_confused_by_part_boundaries() {
        let a = compose_hash(&["ab", "c"]);
        let b = compose_hash(&["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(content_hash_str("hola"), content_hash_str("hola"));
        assert_ne!(content_hash_str("hola"), content_hash_str("chau"));
    }

    #[test]
    fn short_hash8_truncates() {
        let h = content_hash_str("texto de prueba");
        assert_eq!(short_hash8(&h).len(), 8);
        assert!(h.starts_with(short_hash8(&h)));
    }
}
