//! TerritorioCatalog ensure-set.

use norma_core::entities::TerritorioCatalog;
use norma_core::enums::TerritorioTipo;
use norma_parser::ResolvedTerritorio;

const ESTATAL_CODIGO: &str = "ES:STATE";
const ESTATAL_NOMBRE: &str = "Estado";

/// Catalog entries that must exist after processing a norm: `ES:STATE`
/// always, plus the norm's own `CCAA:<dept>` entry when it is autonómica.
#[must_use]
pub fn entries_to_ensure(resolved: &ResolvedTerritorio) -> Vec<TerritorioCatalog> {
    let estatal = TerritorioCatalog {
        codigo: ESTATAL_CODIGO.to_string(),
        nombre: ESTATAL_NOMBRE.to_string(),
        tipo: TerritorioTipo::Estatal,
        departamento_codigo: None,
    };

    if resolved.tipo == TerritorioTipo::Estatal {
        return vec![estatal];
    }

    let autonomico = TerritorioCatalog {
        codigo: resolved.codigo.clone(),
        nombre: resolved.nombre.clone(),
        tipo: TerritorioTipo::Autonomico,
        departamento_codigo: resolved.codigo.strip_prefix("CCAA:").map(str::to_string),
    };

    vec![estatal, autonomico]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estatal_norm_only_ensures_estatal() {
        let resolved = ResolvedTerritorio { tipo: TerritorioTipo::Estatal, codigo: "ES:STATE".into(), nombre: "Estado".into() };
        let entries = entries_to_ensure(&resolved);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].codigo, "ES:STATE");
    }

    #[test]
    fn autonomico_norm_ensures_both() {
        let resolved = ResolvedTerritorio { tipo: TerritorioTipo::Autonomico, codigo: "CCAA:09".into(), nombre: "Cantabria".into() };
        let entries = entries_to_ensure(&resolved);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].codigo, "CCAA:09");
        assert_eq!(entries[1].departamento_codigo.as_deref(), Some("09"));
    }
}
