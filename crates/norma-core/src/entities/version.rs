use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A concrete time-anchored revision of a block. Immutable once inserted;
/// `is_latest` is maintained per block. `id_version = H(id_norma, id_bloque,
/// fecha_vigencia_raw, id_norma_modificadora, hash_xml)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Version {
    pub id_version: String,
    pub id_norma: String,
    pub id_bloque: String,
    pub fecha_vigencia: Option<DateTime<Utc>>,
    pub fecha_vigencia_raw: Option<String>,
    pub fecha_publicacion: Option<DateTime<Utc>>,
    pub fecha_publicacion_raw: Option<String>,
    pub id_norma_modificadora: Option<String>,
    pub hash_xml: String,
    pub file_path: String,
    pub texto_plano: Option<String>,
    pub texto_hash: Option<String>,
    pub chunking_method: Option<String>,
    pub chunking_size: Option<i64>,
    pub chunking_overlap: Option<i64>,
    pub is_latest: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}
