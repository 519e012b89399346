use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::UnidadTipo;

/// Provenance of a unit's text: which method built it, which blocks and
/// index/version hashes it was assembled from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Source {
    pub method: String,
    pub bloques_origen: Vec<String>,
    pub indice_hash: Option<String>,
    pub version_hashes: Vec<String>,
}

/// Denormalized metadata snapshot carried on the unit (and mirrored into
/// chunks) so retrieval never needs a join back to `Norma`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UnidadMetadata {
    pub territorio_codigo: Option<String>,
    pub territorio_tipo: Option<String>,
    pub territorio_nombre: Option<String>,
    pub rango_texto: Option<String>,
    pub ambito_texto: Option<String>,
    pub departamento_texto: Option<String>,
    pub url_html_consolidada: Option<String>,
    pub url_eli: Option<String>,
    pub tags: Vec<String>,
}

/// Retrieval-quality classification of a unit's text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Quality {
    pub is_heading_only: bool,
    pub skip_retrieval: bool,
    pub reason: String,
}

/// The retrieval-facing semantic unit: one article, disposition, annex, or
/// preamble, as it stood at one anchor in the norm's temporal evolution.
/// `id_unidad = H(id_norma, unidad_tipo, unidad_ref, fecha_vigencia_desde,
/// id_norma_modificadora, texto_hash)`. One row per `(lineage, anchor)`;
/// `is_latest` is maintained per `lineage_key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unidad {
    pub id_unidad: String,
    pub id_norma: String,
    pub unidad_tipo: UnidadTipo,
    pub unidad_ref: String,
    pub titulo: Option<String>,
    pub orden: i64,
    pub fecha_vigencia_desde: Option<DateTime<Utc>>,
    pub fecha_vigencia_hasta: Option<DateTime<Utc>>,
    pub fecha_publicacion_mod: Option<DateTime<Utc>>,
    pub id_norma_modificadora: Option<String>,
    pub texto_plano: String,
    pub texto_hash: String,
    pub source: Source,
    pub metadata: UnidadMetadata,
    pub quality: Quality,
    pub lineage_key: String,
    pub is_latest: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Unidad {
    /// Sort key for the total order within a lineage:
    /// `(fecha_vigencia_desde, fecha_publicacion_mod, id_unidad)`, nulls last.
    #[must_use]
    pub fn ordering_key(&self) -> (i64, i64, &str) {
        let desde = self.fecha_vigencia_desde.map_or(i64::MAX, |d| d.timestamp_millis());
        let publicacion = self.fecha_publicacion_mod.map_or(i64::MAX, |d| d.timestamp_millis());
        (desde, publicacion, self.id_unidad.as_str())
    }
}
