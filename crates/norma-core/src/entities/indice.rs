use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed index snapshot for a norm. `id_indice = H(id_norma,
/// fecha_actualizacion_raw, hash_xml)`. `is_latest` is maintained per norm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Indice {
    pub id_indice: String,
    pub id_norma: String,
    pub fecha_actualizacion: Option<DateTime<Utc>>,
    pub fecha_actualizacion_raw: Option<String>,
    pub hash_xml: String,
    pub hash_pretty: String,
    pub file_path: String,
    pub is_latest: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}
