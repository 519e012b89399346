//! Block classification.
//!
//! Every index block is classified into `(unidad_tipo, kind, level)` by
//! matching its id and title against the fixed patterns the source API uses
//! for each structural role. Classification is pure pattern matching — no
//! state, no I/O.

use std::sync::OnceLock;

use norma_core::enums::{BlockKind, UnidadTipo};
use norma_parser::BlockDescriptor;
use regex::Regex;

/// A block after classification, still carrying its original descriptor
/// fields needed downstream (title, timestamp, url).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedBlock {
    pub id_bloque: String,
    pub titulo: String,
    pub url: Option<String>,
    pub fecha_actualizacion_raw: Option<String>,
    pub unidad_tipo: Option<UnidadTipo>,
    pub kind: BlockKind,
    pub level: u8,
}

macro_rules! regex_cache {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static regex is valid"))
        }
    };
}

regex_cache!(noise_title_re, r"(?i)nota|advertencia|r[uú]brica");
regex_cache!(noise_id_re, r"^(fi|no)$");
regex_cache!(titulo_header_re, r"(?i)^t[ivxlcdm]+$");
regex_cache!(capitulo_header_re, r"(?i)^c[ivxlcdm]+$");
regex_cache!(seccion_header_re, r"(?i)^s.*$");
regex_cache!(titulo_prefix_re, r"(?i)^t[íi]tulo\b");
regex_cache!(capitulo_prefix_re, r"(?i)^cap[íi]tulo\b");
regex_cache!(seccion_prefix_re, r"(?i)^secci[óo]n\b");
regex_cache!(articulo_id_re, r"(?i)^(a\d+.*|ar-.*)$");
regex_cache!(articulo_title_re, r"(?i)^art[íi]culo\b");
regex_cache!(da_id_re, r"(?i)^da.*$");
regex_cache!(da_title_re, r"(?i)disposici[óo]n\s+adicional");
regex_cache!(dt_id_re, r"(?i)^dt.*$");
regex_cache!(dt_title_re, r"(?i)disposici[óo]n\s+transitoria");
regex_cache!(df_id_re, r"(?i)^d[df].*$");
regex_cache!(df_title_re, r"(?i)disposici[óo]n\s+(final|derogatoria)");
regex_cache!(anexo_id_re, r"(?i)^a[nx].*$");
regex_cache!(anexo_title_re, r"(?i)^anexo\b");

#[must_use]
fn is_preamble(id: &str, tipo: Option<&str>) -> bool {
    id.eq_ignore_ascii_case("pr") || tipo.is_some_and(|t| t.eq_ignore_ascii_case("preambulo"))
}

/// Classify one index block.
#[must_use]
pub fn classify(block: &BlockDescriptor) -> ClassifiedBlock {
    let id = block.id_bloque.as_str();
    let titulo = block.titulo.as_str();
    let tipo = block.tipo.as_deref();

    let (unidad_tipo, kind, level) = if noise_id_re().is_match(id) || noise_title_re().is_match(titulo) {
        (None, BlockKind::Noise, 5)
    } else if is_preamble(id, tipo) {
        (Some(UnidadTipo::Preambulo), BlockKind::UnitRoot, 1)
    } else if tipo.is_some_and(|t| t.eq_ignore_ascii_case("encabezado")) || titulo_prefix_re().is_match(titulo) {
        if titulo_header_re().is_match(id) || titulo_prefix_re().is_match(titulo) {
            (None, BlockKind::Header, 1)
        } else {
            (None, BlockKind::Header, 1)
        }
    } else if capitulo_header_re().is_match(id) || capitulo_prefix_re().is_match(titulo) {
        (None, BlockKind::Header, 2)
    } else if seccion_header_re().is_match(id) || seccion_prefix_re().is_match(titulo) {
        (None, BlockKind::Header, 3)
    } else if articulo_id_re().is_match(id) || articulo_title_re().is_match(titulo) {
        (Some(UnidadTipo::Articulo), BlockKind::UnitRoot, 4)
    } else if da_id_re().is_match(id) || da_title_re().is_match(titulo) {
        (Some(UnidadTipo::DisposicionAdicional), BlockKind::UnitRoot, 4)
    } else if dt_id_re().is_match(id) || dt_title_re().is_match(titulo) {
        (Some(UnidadTipo::DisposicionTransitoria), BlockKind::UnitRoot, 4)
    } else if df_id_re().is_match(id) || df_title_re().is_match(titulo) {
        (Some(UnidadTipo::DisposicionFinal), BlockKind::UnitRoot, 4)
    } else if anexo_id_re().is_match(id) || anexo_title_re().is_match(titulo) {
        (Some(UnidadTipo::Anexo), BlockKind::UnitRoot, 4)
    } else {
        (None, BlockKind::Other, 5)
    };

    ClassifiedBlock {
        id_bloque: block.id_bloque.clone(),
        titulo: block.titulo.clone(),
        url: block.url.clone(),
        fecha_actualizacion_raw: block.fecha_actualizacion_raw.clone(),
        unidad_tipo,
        kind,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, tipo: Option<&str>, titulo: &str) -> BlockDescriptor {
        BlockDescriptor {
            id_bloque: id.to_string(),
            tipo: tipo.map(str::to_string),
            titulo: titulo.to_string(),
            url: None,
            fecha_actualizacion_raw: None,
        }
    }

    #[test]
    fn classifies_noise_by_id() {
        let c = classify(&block("fi", None, "cualquier cosa"));
        assert_eq!(c.kind, BlockKind::Noise);
    }

    #[test]
    fn classifies_noise_by_title() {
        let c = classify(&block("x1", None, "Nota del editor"));
        assert_eq!(c.kind, BlockKind::Noise);
    }

    #[test]
    fn classifies_preamble() {
        let c = classify(&block("pr", None, "Preambulo"));
        assert_eq!(c.unidad_tipo, Some(UnidadTipo::Preambulo));
        assert_eq!(c.level, 1);
    }

    #[test]
    fn classifies_titulo_header() {
        let c = classify(&block("ti", None, "Título I. Disposiciones generales"));
        assert_eq!(c.kind, BlockKind::Header);
        assert_eq!(c.level, 1);
    }

    #[test]
    fn classifies_articulo_by_id_pattern() {
        let c = classify(&block("a1", None, "Articulo sin prefijo"));
        assert_eq!(c.unidad_tipo, Some(UnidadTipo::Articulo));
        assert_eq!(c.kind, BlockKind::UnitRoot);
    }

    #[test]
    fn classifies_articulo_by_title() {
        let c = classify(&block("xx", None, "Artículo 12. Objeto"));
        assert_eq!(c.unidad_tipo, Some(UnidadTipo::Articulo));
    }

    #[test]
    fn classifies_disposicion_adicional() {
        let c = classify(&block("da1", None, "Disposición adicional primera"));
        assert_eq!(c.unidad_tipo, Some(UnidadTipo::DisposicionAdicional));
    }

    #[test]
    fn classifies_anexo() {
        let c = classify(&block("an1", None, "Anexo I"));
        assert_eq!(c.unidad_tipo, Some(UnidadTipo::Anexo));
    }

    #[test]
    fn falls_back_to_other() {
        let c = classify(&block("zzz", None, "Contenido sin patrón reconocido"));
        assert_eq!(c.kind, BlockKind::Other);
        assert_eq!(c.level, 5);
    }
}
