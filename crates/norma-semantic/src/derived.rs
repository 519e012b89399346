//! `unidad_ref` extraction and `is_heading_only` detection.

use std::sync::OnceLock;

use norma_core::enums::UnidadTipo;
use regex::Regex;

macro_rules! regex_cache {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static regex is valid"))
        }
    };
}

regex_cache!(articulo_ref_re, r"(?i)art[íi]culo\s+([0-9]+\s*(?:bis|ter|quater)?)");
regex_cache!(disposicion_adicional_ref_re, r"(?i)disposici[óo]n\s+adicional\s+(\S+)");
regex_cache!(disposicion_transitoria_ref_re, r"(?i)disposici[óo]n\s+transitoria\s+(\S+)");
regex_cache!(disposicion_final_ref_re, r"(?i)disposici[óo]n\s+(?:final|derogatoria)\s+(\S+)");
regex_cache!(anexo_ref_re, r"(?i)anexo\s+(\S+)");
regex_cache!(apartado_re, r"^\d+\.\s");
regex_cache!(inciso_re, r"^[a-z]\)\s");
regex_cache!(block_id_cleanup_re, r"[^A-Za-z0-9]+");

fn first_non_empty_line(text: &str) -> &str {
    text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}

fn normalized_block_id(id_bloque: &str) -> String {
    block_id_cleanup_re().replace_all(id_bloque, "-").trim_matches('-').to_ascii_uppercase()
}

/// Extract `unidad_ref` from the first non-empty line (or root title),
/// falling back to a normalized block id when no pattern matches.
#[must_use]
pub fn unidad_ref(unidad_tipo: UnidadTipo, header_or_title: &str, id_bloque: &str) -> String {
    let line = first_non_empty_line(header_or_title);

    let captured = match unidad_tipo {
        UnidadTipo::Articulo => articulo_ref_re().captures(line).map(|c| format!("Art. {}", c[1].trim())),
        UnidadTipo::DisposicionAdicional => {
            disposicion_adicional_ref_re().captures(line).map(|c| format!("Disp. adicional {}", c[1].trim()))
        }
        UnidadTipo::DisposicionTransitoria => {
            disposicion_transitoria_ref_re().captures(line).map(|c| format!("Disp. transitoria {}", c[1].trim()))
        }
        UnidadTipo::DisposicionFinal => {
            disposicion_final_ref_re().captures(line).map(|c| format!("Disp. final {}", c[1].trim()))
        }
        UnidadTipo::Anexo => anexo_ref_re().captures(line).map(|c| format!("Anexo {}", c[1].trim())),
        UnidadTipo::Preambulo | UnidadTipo::Otros => None,
    };

    captured.unwrap_or_else(|| normalized_block_id(id_bloque))
}

/// Whether `unidad_tipo` is one of the types `is_heading_only` applies to.
#[must_use]
fn short_header_regex(unidad_tipo: UnidadTipo) -> Option<&'static Regex> {
    match unidad_tipo {
        UnidadTipo::Articulo => Some(articulo_ref_re()),
        UnidadTipo::DisposicionAdicional => Some(disposicion_adicional_ref_re()),
        UnidadTipo::DisposicionTransitoria => Some(disposicion_transitoria_ref_re()),
        UnidadTipo::DisposicionFinal => Some(disposicion_final_ref_re()),
        _ => None,
    }
}

/// For ARTICULO and DISPOSICION_* only: `true` when the unit's text is
/// effectively just its own heading, once apartado/inciso-bearing content
/// and the type's header line are stripped and fewer than 120 characters
/// remain.
#[must_use]
pub fn is_heading_only(unidad_tipo: UnidadTipo, normalized_text: &str) -> bool {
    if !matches!(
        unidad_tipo,
        UnidadTipo::Articulo | UnidadTipo::DisposicionAdicional | UnidadTipo::DisposicionTransitoria | UnidadTipo::DisposicionFinal
    ) {
        return false;
    }

    let lines: Vec<&str> = normalized_text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return true;
    }

    if lines.iter().any(|l| apartado_re().is_match(l) || inciso_re().is_match(l)) {
        return false;
    }

    let Some(header_re) = short_header_regex(unidad_tipo) else { return false };
    let remainder: String = lines
        .iter()
        .filter(|l| !header_re.is_match(l))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    remainder.chars().count() < 120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_articulo_ref() {
        assert_eq!(unidad_ref(UnidadTipo::Articulo, "Artículo 12. Objeto", "a12"), "Art. 12");
    }

    #[test]
    fn extracts_articulo_bis_ref() {
        assert_eq!(unidad_ref(UnidadTipo::Articulo, "Artículo 3 bis. Excepciones", "a3bis"), "Art. 3 bis");
    }

    #[test]
    fn falls_back_to_normalized_block_id() {
        assert_eq!(unidad_ref(UnidadTipo::Anexo, "sin patrón reconocible", "an.1/2"), "AN-1-2");
    }

    #[test]
    fn is_heading_only_true_for_bare_header() {
        let text = "Artículo 12. Objeto\n\nDisposiciones generales del objeto de la norma.";
        assert!(is_heading_only(UnidadTipo::Articulo, text));
    }

    #[test]
    fn is_heading_only_false_when_apartado_present() {
        let text = "Artículo 12. Objeto\n\n1. Primer apartado con contenido normativo extenso.";
        assert!(!is_heading_only(UnidadTipo::Articulo, text));
    }

    #[test]
    fn is_heading_only_false_for_non_applicable_types() {
        assert!(!is_heading_only(UnidadTipo::Anexo, "Anexo I"));
    }
}
