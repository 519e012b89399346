//! Discover-JSON normalizer.
//!
//! The source API's discover response wraps each item with nested
//! `{codigo, texto}` pairs for rank/department/domain. Every field is
//! optional on the wire; a missing field normalizes to `None` rather than
//! failing the whole document.

use chrono::{DateTime, Utc};
use norma_core::entities::Norma;
use serde::Deserialize;

use crate::dates::parse_wire_any;
use crate::error::ParserError;
use crate::territorio::{self, ResolvedTerritorio};

#[derive(Debug, Deserialize)]
struct TextCode {
    codigo: Option<String>,
    texto: Option<String>,
}

/// One item of a discover response's `data` array, as it arrives on the wire.
#[derive(Debug, Deserialize)]
pub struct DiscoverItem {
    identificador: String,
    titulo: Option<String>,
    fecha_actualizacion: Option<String>,
    fecha_publicacion: Option<String>,
    fecha_disposicion: Option<String>,
    url_html_consolidada: Option<String>,
    rango: Option<TextCode>,
    departamento: Option<TextCode>,
    ambito: Option<TextCode>,
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ParserError> {
    match raw {
        Some(s) if !s.is_empty() => Ok(Some(parse_wire_any(s)?)),
        _ => Ok(None),
    }
}

/// Normalize one discover item into a [`Norma`], filling `territorio_codigo`
/// via [`territorio::resolve`] and stamping both `first_seen_at`/
/// `last_seen_at` to `now` — the caller's repository upsert will preserve
/// `first_seen_at` if the norm already existed.
///
/// # Errors
///
/// Returns `ParserError::MalformedJson` if `raw` is not a valid discover
/// item, or `ParserError::MalformedDate` if a date field is present but
/// doesn't match either wire shape.
pub fn normalize(raw: &serde_json::Value, now: DateTime<Utc>) -> Result<Norma, ParserError> {
    let item: DiscoverItem =
        serde_json::from_value(raw.clone()).map_err(|e| ParserError::MalformedJson(e.to_string()))?;

    let ambito_codigo = item.ambito.as_ref().and_then(|a| a.codigo.clone());
    let ambito_texto = item.ambito.as_ref().and_then(|a| a.texto.clone());
    let departamento_codigo = item.departamento.as_ref().and_then(|d| d.codigo.clone());
    let departamento_texto = item.departamento.as_ref().and_then(|d| d.texto.clone());

    let ResolvedTerritorio { codigo: territorio_codigo, .. } = territorio::resolve(
        ambito_codigo.as_deref(),
        ambito_texto.as_deref(),
        departamento_codigo.as_deref(),
        departamento_texto.as_deref(),
    );

    Ok(Norma {
        id_norma: item.identificador,
        titulo: item.titulo.unwrap_or_default(),
        rango_codigo: item.rango.as_ref().and_then(|r| r.codigo.clone()),
        rango_texto: item.rango.as_ref().and_then(|r| r.texto.clone()),
        ambito_codigo,
        ambito_texto,
        departamento_codigo,
        departamento_texto,
        territorio_codigo,
        fecha_actualizacion: parse_optional_date(item.fecha_actualizacion.as_deref())?,
        fecha_publicacion: parse_optional_date(item.fecha_publicacion.as_deref())?,
        fecha_disposicion: parse_optional_date(item.fecha_disposicion.as_deref())?,
        url_consolidated: item.url_html_consolidada,
        raw_json: raw.clone(),
        first_seen_at: now,
        last_seen_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_a_complete_item() {
        let raw = serde_json::json!({
            "identificador": "BOE-A-2015-10566",
            "titulo": "Ley 1/2015",
            "fecha_actualizacion": "20260115",
            "fecha_publicacion": "20150101",
            "fecha_disposicion": "20141231",
            "url_html_consolidada": "https://boe.es/x",
            "rango": {"codigo": "2200", "texto": "LEY"},
            "departamento": {"codigo": "7723", "texto": "Jefatura del Estado"},
            "ambito": {"codigo": "1", "texto": "Estatal"},
        });
        let norma = normalize(&raw, Utc::now()).unwrap();
        assert_eq!(norma.id_norma, "BOE-A-2015-10566");
        assert_eq!(norma.territorio_codigo, "ES:STATE");
        assert!(norma.fecha_actualizacion.is_some());
    }

    #[test]
    fn missing_fields_become_none() {
        let raw = serde_json::json!({"identificador": "BOE-A-1"});
        let norma = normalize(&raw, Utc::now()).unwrap();
        assert_eq!(norma.titulo, "");
        assert!(norma.rango_codigo.is_none());
        assert!(norma.fecha_actualizacion.is_none());
        assert_eq!(norma.territorio_codigo, "CCAA:UNKNOWN");
    }

    #[test]
    fn rejects_malformed_date() {
        let raw = serde_json::json!({"identificador": "BOE-A-1", "fecha_actualizacion": "not-a-date"});
        assert!(normalize(&raw, Utc::now()).is_err());
    }
}
