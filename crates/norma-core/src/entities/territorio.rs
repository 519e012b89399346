use serde::{Deserialize, Serialize};

use crate::enums::TerritorioTipo;

/// Geographic scope catalog entry, keyed by `codigo` (e.g. `ES:STATE`,
/// `CCAA:<dept>`). Upserted whenever a norm is processed; `ES:STATE` is
/// always ensured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TerritorioCatalog {
    pub codigo: String,
    pub nombre: String,
    pub tipo: TerritorioTipo,
    pub departamento_codigo: Option<String>,
}
