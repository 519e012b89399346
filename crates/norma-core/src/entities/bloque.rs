use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A constituent section of a norm as exposed by its index: a heading,
/// article, or disposition. Created/updated from the index; dirty detection
/// compares `fecha_actualizacion_raw` against the previously stored value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bloque {
    pub id_bloque_row: String,
    pub id_norma: String,
    pub id_bloque: String,
    pub tipo: Option<String>,
    pub titulo: String,
    pub fecha_actualizacion_raw: Option<String>,
    pub url: Option<String>,
    pub latest_version_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}
