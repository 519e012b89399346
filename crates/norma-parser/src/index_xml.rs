//! Index-XML normalizer.
//!
//! `<response><status code=.../><data><bloque .../>...</data></response>`.
//! A `bloque` element may carry its fields as attributes or as child
//! elements; both forms are tolerated. The index's own update timestamp is
//! the max of its blocks' timestamps (raw lexical max — the tokens are
//! fixed-width so lexical order matches chronological order).

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParserError;

/// One block descriptor as listed by a norm's index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockDescriptor {
    pub id_bloque: String,
    pub tipo: Option<String>,
    pub titulo: String,
    pub url: Option<String>,
    pub fecha_actualizacion_raw: Option<String>,
}

#[derive(Default)]
struct BlockDraft {
    id_bloque: Option<String>,
    tipo: Option<String>,
    titulo: Option<String>,
    url: Option<String>,
    fecha_actualizacion_raw: Option<String>,
}

impl BlockDraft {
    fn finish(self) -> Result<BlockDescriptor, ParserError> {
        Ok(BlockDescriptor {
            id_bloque: self.id_bloque.ok_or_else(|| ParserError::MalformedXml("bloque missing id".into()))?,
            tipo: self.tipo,
            titulo: self.titulo.unwrap_or_default(),
            url: self.url,
            fecha_actualizacion_raw: self.fecha_actualizacion_raw,
        })
    }

    fn apply_attr(&mut self, key: &[u8], value: String) {
        match key {
            b"id" => self.id_bloque.get_or_insert(value),
            b"tipo" => self.tipo.get_or_insert(value),
            b"titulo" => self.titulo.get_or_insert(value),
            b"url" => self.url.get_or_insert(value),
            b"fecha_actualizacion" => self.fecha_actualizacion_raw.get_or_insert(value),
            _ => return,
        };
    }

    fn apply_child(&mut self, tag: &str, value: String) {
        match tag {
            "id" => self.id_bloque.get_or_insert(value),
            "tipo" => self.tipo.get_or_insert(value),
            "titulo" => self.titulo.get_or_insert(value),
            "url" => self.url.get_or_insert(value),
            "fecha_actualizacion" => self.fecha_actualizacion_raw.get_or_insert(value),
            _ => return,
        };
    }
}

/// A norm's index: its ordered block list plus the derived top-level update
/// timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexDocument {
    pub bloques: Vec<BlockDescriptor>,
    pub fecha_actualizacion_raw: Option<String>,
}

/// Parse an index-XML document.
///
/// # Errors
///
/// Returns `ParserError::MalformedXml` on unparseable XML or a `bloque`
/// missing its id.
pub fn parse_index_xml(raw: &str) -> Result<IndexDocument, ParserError> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text = true;
    let mut buf = Vec::new();

    let mut bloques = Vec::new();
    let mut current: Option<BlockDraft> = None;
    let mut current_child: Option<String> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| ParserError::MalformedXml(e.to_string()))?;
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"bloque" => {
                let mut draft = BlockDraft::default();
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    draft.apply_attr(attr.key.local_name().as_ref(), value);
                }
                current = Some(draft);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"bloque" => {
                let mut draft = BlockDraft::default();
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().unwrap_or_default().into_owned();
                    draft.apply_attr(attr.key.local_name().as_ref(), value);
                }
                bloques.push(draft.finish()?);
            }
            Event::End(e) if e.local_name().as_ref() == b"bloque" => {
                if let Some(draft) = current.take() {
                    bloques.push(draft.finish()?);
                }
            }
            Event::Start(e) if current.is_some() => {
                current_child = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Text(t) if current.is_some() => {
                if let Some(tag) = current_child.take() {
                    let text = t.unescape().unwrap_or_default().into_owned();
                    if let Some(draft) = current.as_mut() {
                        draft.apply_child(&tag, text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let fecha_actualizacion_raw = bloques
        .iter()
        .filter_map(|b| b.fecha_actualizacion_raw.as_deref())
        .max()
        .map(str::to_string);

    Ok(IndexDocument { bloques, fecha_actualizacion_raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attribute_form() {
        let xml = r#"<response><status code="200"/><data>
            <bloque id="a1" tipo="articulo" titulo="Articulo 1" fecha_actualizacion="20260101"/>
            <bloque id="a2" tipo="articulo" titulo="Articulo 2" fecha_actualizacion="20260201"/>
        </data></response>"#;
        let doc = parse_index_xml(xml).unwrap();
        assert_eq!(doc.bloques.len(), 2);
        assert_eq!(doc.bloques[0].id_bloque, "a1");
        assert_eq!(doc.fecha_actualizacion_raw.as_deref(), Some("20260201"));
    }

    #[test]
    fn parses_child_form() {
        let xml = r#"<response><data>
            <bloque><id>a1</id><tipo>articulo</tipo><titulo>Articulo 1</titulo></bloque>
        </data></response>"#;
        let doc = parse_index_xml(xml).unwrap();
        assert_eq!(doc.bloques.len(), 1);
        assert_eq!(doc.bloques[0].titulo, "Articulo 1");
    }

    #[test]
    fn rejects_bloque_without_id() {
        let xml = r#"<response><data><bloque tipo="articulo"/></data></response>"#;
        assert!(parse_index_xml(xml).is_err());
    }
}
