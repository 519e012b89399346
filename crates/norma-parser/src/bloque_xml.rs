//! Bloque-XML normalizer.
//!
//! `<response><data><bloque id tipo titulo><version .../>...</bloque></data></response>`.
//! Each version's hash must stay stable regardless of how the parser
//! re-orders or re-serializes fields, so the raw XML slice of each
//! `<version>` element is extracted straight from the source text with a
//! regex rather than rebuilt from parsed attributes. If the regex can't
//! find a matching slice for a parsed version (malformed markup around it),
//! a best-effort reconstruction from the parsed attributes is used instead.

use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::ParserError;

/// One block revision as listed in a bloque-XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSlice {
    pub fecha_vigencia_raw: Option<String>,
    pub fecha_publicacion_raw: Option<String>,
    pub id_norma_modificadora: Option<String>,
    pub raw_xml: String,
}

/// A block's metadata plus its ordered version history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BloqueDocument {
    pub tipo: Option<String>,
    pub titulo: Option<String>,
    pub versions: Vec<VersionSlice>,
}

#[derive(Default, Clone)]
struct VersionDraft {
    fecha_vigencia_raw: Option<String>,
    fecha_publicacion_raw: Option<String>,
    id_norma_modificadora: Option<String>,
}

impl VersionDraft {
    fn apply(&mut self, key: &[u8], value: String) {
        match key {
            b"fecha_vigencia" => self.fecha_vigencia_raw = Some(value),
            b"fecha_publicacion" => self.fecha_publicacion_raw = Some(value),
            b"id_norma" | b"id_norma_modificadora" => self.id_norma_modificadora = Some(value),
            _ => {}
        }
    }

    fn rebuild_raw_xml(&self) -> String {
        format!(
            "<version fecha_vigencia=\"{}\" fecha_publicacion=\"{}\" id_norma=\"{}\"/>",
            escape(self.fecha_vigencia_raw.as_deref().unwrap_or_default()),
            escape(self.fecha_publicacion_raw.as_deref().unwrap_or_default()),
            escape(self.id_norma_modificadora.as_deref().unwrap_or_default()),
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn version_slice_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<version\b[^>]*(?:/>|>.*?</version>)").expect("static regex is valid"))
}

/// Parse a bloque-XML document.
///
/// # Errors
///
/// Returns `ParserError::MalformedXml` if the document is not well-formed.
pub fn parse_bloque_xml(raw: &str) -> Result<BloqueDocument, ParserError> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text = true;
    let mut buf = Vec::new();

    let mut tipo = None;
    let mut titulo = None;
    let mut drafts: Vec<VersionDraft> = Vec::new();
    let mut current: Option<VersionDraft> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| ParserError::MalformedXml(e.to_string()))?;
        match event {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"bloque" => {
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    match attr.key.local_name().as_ref() {
                        b"tipo" => tipo = Some(value),
                        b"titulo" => titulo = Some(value),
                        _ => {}
                    }
                }
            }
            Event::Start(e) if e.local_name().as_ref() == b"version" => {
                let mut draft = VersionDraft::default();
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    draft.apply(attr.key.local_name().as_ref(), value);
                }
                current = Some(draft);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"version" => {
                let mut draft = VersionDraft::default();
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    draft.apply(attr.key.local_name().as_ref(), value);
                }
                drafts.push(draft);
            }
            Event::End(e) if e.local_name().as_ref() == b"version" => {
                if let Some(draft) = current.take() {
                    drafts.push(draft);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let regex_slices: Vec<&str> = version_slice_regex().find_iter(raw).map(|m| m.as_str()).collect();

    let versions = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| {
            let raw_xml = regex_slices.get(i).map(|s| (*s).to_string()).unwrap_or_else(|| draft.rebuild_raw_xml());
            VersionSlice {
                fecha_vigencia_raw: draft.fecha_vigencia_raw,
                fecha_publicacion_raw: draft.fecha_publicacion_raw,
                id_norma_modificadora: draft.id_norma_modificadora,
                raw_xml,
            }
        })
        .collect();

    Ok(BloqueDocument { tipo, titulo, versions })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_versions_with_raw_slices() {
        let xml = r#"<response><data><bloque id="a1" tipo="articulo" titulo="Articulo 1">
            <version fecha_vigencia="20260101" fecha_publicacion="20250101" id_norma="BOE-A-OLD">texto</version>
            <version fecha_vigencia="20260201"/>
        </bloque></data></response>"#;
        let doc = parse_bloque_xml(xml).unwrap();
        assert_eq!(doc.tipo.as_deref(), Some("articulo"));
        assert_eq!(doc.versions.len(), 2);
        assert!(doc.versions[0].raw_xml.contains("texto"));
        assert_eq!(doc.versions[0].id_norma_modificadora.as_deref(), Some("BOE-A-OLD"));
        assert_eq!(doc.versions[1].fecha_vigencia_raw.as_deref(), Some("20260201"));
    }

    #[test]
    fn raw_slice_is_stable_regardless_of_attribute_order() {
        let xml = r#"<data><bloque><version id_norma="X" fecha_vigencia="20260101" fecha_publicacion="20250101"/></bloque></data>"#;
        let doc = parse_bloque_xml(xml).unwrap();
        assert_eq!(
            doc.versions[0].raw_xml,
            r#"<version id_norma="X" fecha_vigencia="20260101" fecha_publicacion="20250101"/>"#
        );
    }
}
