//! Territorio resolution.
//!
//! Maps a discover document's raw `ambito`/`departamento` text/code pairs
//! onto a catalog entry: estatal norms carry a fixed code, autonomic norms
//! derive theirs from the issuing department.

use norma_core::enums::TerritorioTipo;

const ESTATAL_CODIGO: &str = "ES:STATE";
const ESTATAL_NOMBRE: &str = "Estado";
const UNKNOWN_DEPARTAMENTO: &str = "UNKNOWN";

/// Resolved territorial scope of a norm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTerritorio {
    pub tipo: TerritorioTipo,
    pub codigo: String,
    pub nombre: String,
}

/// Resolve a norm's territorial scope from its raw `ambito`/`departamento`
/// fields.
///
/// Rule: `ambito.codigo == "1"`, or the domain text matching `/estatal/i`,
/// means ESTATAL with the fixed `ES:STATE` code; otherwise AUTONOMICO, with
/// the code derived from `departamento.codigo` (or `UNKNOWN`) and the name
/// from `departamento.texto` (or a generic fallback).
#[must_use]
pub fn resolve(
    ambito_codigo: Option<&str>,
    ambito_texto: Option<&str>,
    departamento_codigo: Option<&str>,
    departamento_texto: Option<&str>,
) -> ResolvedTerritorio {
    let is_estatal = ambito_codigo == Some("1")
        || ambito_texto.is_some_and(|t| t.to_lowercase().contains("estatal"));

    if is_estatal {
        return ResolvedTerritorio {
            tipo: TerritorioTipo::Estatal,
            codigo: ESTATAL_CODIGO.to_string(),
            nombre: ESTATAL_NOMBRE.to_string(),
        };
    }

    let dept_code = departamento_codigo.unwrap_or(UNKNOWN_DEPARTAMENTO);
    ResolvedTerritorio {
        tipo: TerritorioTipo::Autonomico,
        codigo: format!("CCAA:{dept_code}"),
        nombre: departamento_texto
            .map(str::to_string)
            .unwrap_or_else(|| format!("Comunidad Autonoma ({dept_code})")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambito_codigo_one_is_estatal() {
        let r = resolve(Some("1"), None, None, None);
        assert_eq!(r.tipo, TerritorioTipo::Estatal);
        assert_eq!(r.codigo, "ES:STATE");
    }

    #[test]
    fn domain_text_matching_estatal_is_case_insensitive() {
        let r = resolve(None, Some("Ambito ESTATAL"), None, None);
        assert_eq!(r.tipo, TerritorioTipo::Estatal);
    }

    #[test]
    fn autonomico_derives_code_from_department() {
        let r = resolve(Some("2"), Some("Autonomico"), Some("09"), Some("Cantabria"));
        assert_eq!(r.tipo, TerritorioTipo::Autonomico);
        assert_eq!(r.codigo, "CCAA:09");
        assert_eq!(r.nombre, "Cantabria");
    }

    #[test]
    fn autonomico_without_department_code_falls_back_to_unknown() {
        let r = resolve(Some("2"), None, None, None);
        assert_eq!(r.codigo, "CCAA:UNKNOWN");
    }
}
