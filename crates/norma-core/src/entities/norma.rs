use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A legislative document, identified by a stable external id (e.g.
/// `BOE-A-2015-10566`). Created by discover; updated in place when its
/// metadata changes; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Norma {
    pub id_norma: String,
    pub titulo: String,
    pub rango_codigo: Option<String>,
    pub rango_texto: Option<String>,
    pub ambito_codigo: Option<String>,
    pub ambito_texto: Option<String>,
    pub departamento_codigo: Option<String>,
    pub departamento_texto: Option<String>,
    pub territorio_codigo: String,
    pub fecha_actualizacion: Option<DateTime<Utc>>,
    pub fecha_publicacion: Option<DateTime<Utc>>,
    pub fecha_disposicion: Option<DateTime<Utc>>,
    pub url_consolidated: Option<String>,
    pub raw_json: serde_json::Value,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}
