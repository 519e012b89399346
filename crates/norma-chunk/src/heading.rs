//! Chunk-level heading-only detection, independent of the
//! unit-level check in `norma-semantic::derived::is_heading_only`.
//!
//! A chunk is dropped when it is short, carries none of the structural
//! content markers (apartado/dash-apartado/inciso), has at most two "long"
//! sentences, and its two non-empty lines are nothing but the type's short
//! reference line followed by its full title line.

use std::sync::OnceLock;

use regex::Regex;

const SHORT_TEXT_LIMIT: usize = 120;
const LONG_SENTENCE_LEN: usize = 35;
const MAX_LONG_SENTENCES: usize = 2;

macro_rules! regex_cache {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static regex is valid"))
        }
    };
}

regex_cache!(apartado_re, r"^\d+\.\s");
regex_cache!(dash_apartado_re, r"^-\s");
regex_cache!(inciso_re, r"^[a-z]\)\s");

regex_cache!(articulo_short_re, r"(?i)^art\.?\s*\d+");
regex_cache!(articulo_title_re, r"(?i)^art[íi]culo\s+\d+");
regex_cache!(disposicion_short_re, r"(?i)^disp\.?\s+(adicional|transitoria|final|derogatoria)\s+\S+");
regex_cache!(disposicion_title_re, r"(?i)^disposici[óo]n\s+(adicional|transitoria|final|derogatoria)\s+\S+");

/// The short-reference/full-title regex pair for a retrieval-unit type the
/// chunk heading check applies to.
fn header_pair(unidad_tipo_is_articulo: bool) -> (&'static Regex, &'static Regex) {
    if unidad_tipo_is_articulo {
        (articulo_short_re(), articulo_title_re())
    } else {
        (disposicion_short_re(), disposicion_title_re())
    }
}

fn has_structural_marker(text: &str) -> bool {
    text.lines().any(|l| {
        let l = l.trim_start();
        apartado_re().is_match(l) || dash_apartado_re().is_match(l) || inciso_re().is_match(l)
    })
}

fn long_sentence_count(text: &str) -> usize {
    text.split(['.', '\n']).map(str::trim).filter(|s| s.chars().count() >= LONG_SENTENCE_LEN).count()
}

/// `true` when `unidad_tipo_is_articulo` selects the ARTICULO header pair
/// and the remaining DISPOSICION_* types otherwise share one pair; `true`
/// result means the chunk carries no content beyond a duplicated heading
/// and should be dropped.
#[must_use]
pub fn is_heading_only_chunk(unidad_tipo_is_articulo: bool, text: &str) -> bool {
    if text.chars().count() >= SHORT_TEXT_LIMIT {
        return false;
    }
    if has_structural_marker(text) {
        return false;
    }
    if long_sentence_count(text) > MAX_LONG_SENTENCES {
        return false;
    }

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.len() != 2 {
        return false;
    }

    let (short_re, title_re) = header_pair(unidad_tipo_is_articulo);
    short_re.is_match(lines[0]) && title_re.is_match(lines[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_bare_articulo_heading_pair() {
        let text = "Art. 12\nArtículo 12. Disposiciones generales";
        assert!(is_heading_only_chunk(true, text));
    }

    #[test]
    fn keeps_chunk_with_apartado_content() {
        let text = "Art. 12\nArtículo 12. Disposiciones generales\n1. Contenido normativo real.";
        assert!(!is_heading_only_chunk(true, text));
    }

    #[test]
    fn keeps_long_chunk() {
        let text = format!("Art. 12\nArtículo 12. {}", "x".repeat(150));
        assert!(!is_heading_only_chunk(true, &text));
    }

    #[test]
    fn keeps_chunk_with_more_than_two_lines() {
        let text = "Art. 12\nArtículo 12. Disposiciones generales\nTexto adicional.";
        assert!(!is_heading_only_chunk(true, text));
    }

    #[test]
    fn drops_bare_disposicion_heading_pair() {
        let text = "Disp. adicional primera\nDisposición adicional primera. Régimen transitorio";
        assert!(is_heading_only_chunk(false, text));
    }
}
