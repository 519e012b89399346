//! Request/response types and pure scoring logic for `/rag/search` and
//! `/rag/answer`.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use norma_core::enums::{RagMode, UnidadTipo};
use norma_vector::PointPayload;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::error::ApiError;

/// `scope` request field: which territories a search is allowed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Estatal,
    AutonomicoMasEstatal,
}

fn default_top_k() -> u32 {
    8
}

const fn default_min_score() -> f32 {
    0.0
}

/// Body shared by `/rag/search` and `/rag/answer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagRequest {
    pub query: String,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub ccaa_codigo: Option<String>,
    #[serde(default)]
    pub territorio: Option<String>,
    #[serde(default)]
    pub mode: RagMode,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    #[serde(default)]
    pub include_preambulo: bool,
}

impl RagRequest {
    /// Validate and apply request-independent defaults, returning the
    /// effective `as_of` instant (UTC day start, per spec) and clamped `topK`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if `query` is too short, `topK` is out of range,
    /// or the scope/`ccaaCodigo` combination is invalid.
    pub fn validate(&self, config: &ApiConfig) -> Result<(DateTime<Utc>, u32), ApiError> {
        if self.query.trim().chars().count() < 3 {
            return Err(ApiError::QueryTooShort);
        }
        if self.top_k < 1 || self.top_k > config.max_top_k {
            return Err(ApiError::TopKOutOfRange { max: config.max_top_k });
        }
        if self.scope == Some(Scope::AutonomicoMasEstatal) {
            let ccaa = self.ccaa_codigo.as_deref().unwrap_or_default();
            if !ccaa.starts_with("CCAA:") {
                return Err(ApiError::MissingOrInvalidCcaa);
            }
        }
        let as_of = self.as_of.unwrap_or_else(today_utc_start);
        Ok((as_of, self.top_k))
    }
}

fn today_utc_start() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0).single().unwrap_or(now)
}

const ARTICLE_AND_DISPOSITION_AND_ANEXO: [UnidadTipo; 4] =
    [UnidadTipo::Articulo, UnidadTipo::DisposicionAdicional, UnidadTipo::DisposicionTransitoria, UnidadTipo::DisposicionFinal];

/// Allowed unit-type set for the vector filter: articles, dispositions, and
/// annex, plus preamble iff `MIXTO` or `includePreambulo`.
#[must_use]
pub fn allowed_unidad_tipos(mode: RagMode, include_preambulo: bool) -> Vec<UnidadTipo> {
    let mut tipos: Vec<UnidadTipo> = ARTICLE_AND_DISPOSITION_AND_ANEXO.to_vec();
    tipos.push(UnidadTipo::Anexo);
    if mode == RagMode::Mixto || include_preambulo {
        tipos.push(UnidadTipo::Preambulo);
    }
    tipos
}

/// Build the Qdrant-style filter for one search: the temporal pair, the
/// allowed unit-type set, and an optional territorio match.
#[must_use]
pub fn build_vector_filter(as_of: DateTime<Utc>, mode: RagMode, include_preambulo: bool, territorio_match: Option<&TerritorioMatch>) -> Value {
    let as_of_ms = as_of.timestamp_millis();
    let tipos: Vec<&'static str> = allowed_unidad_tipos(mode, include_preambulo).into_iter().map(UnidadTipo::as_str).collect();

    let mut must = vec![
        json!({ "key": "vigencia_desde", "range": { "lte": as_of_ms } }),
        json!({ "key": "vigencia_hasta", "range": { "gt": as_of_ms } }),
        json!({ "key": "unidad_tipo", "match": { "any": tipos } }),
    ];
    if let Some(territorio) = territorio_match {
        must.push(territorio.to_filter_clause());
    }
    json!({ "must": must })
}

/// How a search's territorio scope is expressed in the vector filter: a
/// single code, or any of a set (`AUTONOMICO_MAS_ESTATAL`'s CCAA + state).
#[derive(Debug, Clone)]
pub enum TerritorioMatch {
    One(String),
    AnyOf(Vec<String>),
}

impl TerritorioMatch {
    fn to_filter_clause(&self) -> Value {
        match self {
            Self::One(codigo) => json!({ "key": "territorio_codigo", "match": { "value": codigo } }),
            Self::AnyOf(codigos) => json!({ "key": "territorio_codigo", "match": { "any": codigos } }),
        }
    }
}

/// Resolve `scope`/`ccaaCodigo`/`territorio` into the filter's territorio
/// match: `ESTATAL` forces `[ES:STATE]`,
/// `AUTONOMICO_MAS_ESTATAL` requires `ccaaCodigo` and matches it plus the
/// state, otherwise a single `territorio` (if given) is applied as-is.
#[must_use]
pub fn resolve_territorio_match(scope: Option<Scope>, ccaa_codigo: Option<&str>, territorio: Option<&str>) -> Option<TerritorioMatch> {
    match scope {
        Some(Scope::Estatal) => Some(TerritorioMatch::One("ES:STATE".to_string())),
        Some(Scope::AutonomicoMasEstatal) => {
            ccaa_codigo.map(|ccaa| TerritorioMatch::AnyOf(vec![ccaa.to_string(), "ES:STATE".to_string()]))
        }
        None => territorio.map(|t| TerritorioMatch::One(t.to_string())),
    }
}

/// Post-score boost applied deterministically by mode: `VIGENCIA`
/// rewards `DISPOSICION_FINAL`/derogatoria titles, then transitoria/
/// adicional, the `nota_inicial` tag, and articles; `MIXTO` rewards articles
/// then other dispositions. `NORMATIVO` applies no boost.
#[must_use]
pub fn boost_for(mode: RagMode, payload: &PointPayload) -> f32 {
    let Ok(tipo) = payload.unidad_tipo.parse::<UnidadTipoStr>() else { return 0.0 };
    let tipo = tipo.0;
    match mode {
        RagMode::Normativo => 0.0,
        RagMode::Vigencia => {
            let mut boost = 0.0;
            if tipo == UnidadTipo::DisposicionFinal {
                boost += 0.08;
            } else if matches!(tipo, UnidadTipo::DisposicionTransitoria | UnidadTipo::DisposicionAdicional) {
                boost += 0.04;
            }
            if payload.tags.iter().any(|tag| tag == "nota_inicial") {
                boost += 0.1;
            }
            if tipo == UnidadTipo::Articulo {
                boost += 0.02;
            }
            boost
        }
        RagMode::Mixto => {
            if tipo == UnidadTipo::Articulo {
                0.03
            } else if tipo.is_disposicion() {
                0.02
            } else {
                0.0
            }
        }
    }
}

/// Thin wrapper so `unidad_tipo`'s `ARTICULO`/`DISPOSICION_FINAL`-style
/// string can round-trip through [`UnidadTipo::as_str`] without a public
/// `FromStr` on the enum itself.
struct UnidadTipoStr(UnidadTipo);

impl std::str::FromStr for UnidadTipoStr {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tipo = match s {
            "ARTICULO" => UnidadTipo::Articulo,
            "DISPOSICION_ADICIONAL" => UnidadTipo::DisposicionAdicional,
            "DISPOSICION_TRANSITORIA" => UnidadTipo::DisposicionTransitoria,
            "DISPOSICION_FINAL" => UnidadTipo::DisposicionFinal,
            "ANEXO" => UnidadTipo::Anexo,
            "PREAMBULO" => UnidadTipo::Preambulo,
            "OTROS" => UnidadTipo::Otros,
            _ => return Err(()),
        };
        Ok(Self(tipo))
    }
}

/// A scored, boosted search result, ready to be serialized in a
/// `/rag/search` or `/rag/answer` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultItem {
    pub chunk_id: String,
    pub id_norma: String,
    pub id_unidad: String,
    pub unidad_tipo: String,
    pub unidad_ref: String,
    pub titulo: Option<String>,
    pub territorio_codigo: Option<String>,
    pub vigencia_desde: Option<DateTime<Utc>>,
    pub score: f32,
    pub text: String,
}

impl SearchResultItem {
    #[must_use]
    pub fn from_scored(scored: &norma_vector::ScoredPoint, boosted_score: f32) -> Self {
        let payload = &scored.payload;
        Self {
            chunk_id: payload.chunk_id.clone(),
            id_norma: payload.id_norma.clone(),
            id_unidad: payload.id_unidad.clone(),
            unidad_tipo: payload.unidad_tipo.clone(),
            unidad_ref: payload.unidad_ref.clone(),
            titulo: payload.titulo.clone(),
            territorio_codigo: payload.territorio_codigo.clone(),
            vigencia_desde: Utc.timestamp_millis_opt(payload.vigencia_desde).single(),
            score: boosted_score,
            text: payload.text.clone(),
        }
    }

    /// The citation label `/rag/answer` attaches to each used result:
    /// `"<id_norma> - <unidad_ref> (vigente desde <YYYY-MM-DD>)"`.
    #[must_use]
    pub fn citation_label(&self) -> String {
        let fecha = self.vigencia_desde.map_or_else(|| "?".to_string(), |d| d.format("%Y-%m-%d").to_string());
        format!("{} - {} (vigente desde {fecha})", self.id_norma, self.unidad_ref)
    }
}

/// Re-score each candidate with [`boost_for`], drop anything under
/// `min_score`, sort descending, and slice to `top_k`.
#[must_use]
pub fn rank_candidates(candidates: Vec<norma_vector::ScoredPoint>, mode: RagMode, min_score: f32, top_k: u32) -> Vec<SearchResultItem> {
    let mut scored: Vec<SearchResultItem> = candidates
        .iter()
        .map(|candidate| SearchResultItem::from_scored(candidate, candidate.score + boost_for(mode, &candidate.payload)))
        .filter(|item| item.score >= min_score)
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k as usize);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use norma_vector::ScoredPoint;

    fn payload(unidad_tipo: &str, tags: Vec<&str>) -> PointPayload {
        PointPayload {
            chunk_id: "c1".into(),
            id_norma: "BOE-A-1".into(),
            id_unidad: "u1".into(),
            unidad_tipo: unidad_tipo.to_string(),
            unidad_ref: "Art. 1".into(),
            titulo: None,
            territorio_codigo: None,
            territorio_tipo: None,
            territorio_nombre: None,
            vigencia_desde: 0,
            vigencia_hasta: norma_vector::VIGENCIA_HASTA_SENTINEL_MS,
            url_html_consolidada: None,
            url_eli: None,
            tags: tags.into_iter().map(str::to_string).collect(),
            text: "texto".into(),
            texto_hash: "h".into(),
            chunking_hash: "c".into(),
        }
    }

    #[test]
    fn normativo_applies_no_boost() {
        assert_eq!(boost_for(RagMode::Normativo, &payload("DISPOSICION_FINAL", vec![])), 0.0);
    }

    #[test]
    fn vigencia_boosts_disposicion_final_and_nota_inicial() {
        let boosted = boost_for(RagMode::Vigencia, &payload("DISPOSICION_FINAL", vec!["nota_inicial"]));
        assert!((boosted - 0.18).abs() < 1e-6);
    }

    #[test]
    fn vigencia_boosts_articulo() {
        assert!((boost_for(RagMode::Vigencia, &payload("ARTICULO", vec![])) - 0.02).abs() < 1e-6);
    }

    #[test]
    fn mixto_rewards_articles_over_other_dispositions() {
        let article = boost_for(RagMode::Mixto, &payload("ARTICULO", vec![]));
        let disposicion = boost_for(RagMode::Mixto, &payload("DISPOSICION_ADICIONAL", vec![]));
        assert!(article > disposicion);
    }

    #[test]
    fn allowed_tipos_include_preambulo_only_when_requested() {
        assert!(!allowed_unidad_tipos(RagMode::Normativo, false).contains(&UnidadTipo::Preambulo));
        assert!(allowed_unidad_tipos(RagMode::Mixto, false).contains(&UnidadTipo::Preambulo));
        assert!(allowed_unidad_tipos(RagMode::Normativo, true).contains(&UnidadTipo::Preambulo));
    }

    #[test]
    fn vector_filter_has_temporal_pair_and_unidad_tipo_clause() {
        let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filter = build_vector_filter(as_of, RagMode::Normativo, false, None);
        let must = filter["must"].as_array().unwrap();
        assert!(must.iter().any(|clause| clause["key"] == "vigencia_desde" && clause["range"]["lte"] == as_of.timestamp_millis()));
        assert!(must.iter().any(|clause| clause["key"] == "vigencia_hasta" && clause["range"]["gt"] == as_of.timestamp_millis()));
        assert!(must.iter().any(|clause| clause["key"] == "unidad_tipo"));
    }

    #[test]
    fn estatal_scope_forces_es_state() {
        let m = resolve_territorio_match(Some(Scope::Estatal), None, Some("CCAA:09")).unwrap();
        match m {
            TerritorioMatch::One(codigo) => assert_eq!(codigo, "ES:STATE"),
            TerritorioMatch::AnyOf(_) => panic!("expected One"),
        }
    }

    #[test]
    fn autonomico_mas_estatal_matches_ccaa_plus_state() {
        let m = resolve_territorio_match(Some(Scope::AutonomicoMasEstatal), Some("CCAA:09"), None).unwrap();
        match m {
            TerritorioMatch::AnyOf(codigos) => assert_eq!(codigos, vec!["CCAA:09".to_string(), "ES:STATE".to_string()]),
            TerritorioMatch::One(_) => panic!("expected AnyOf"),
        }
    }

    #[test]
    fn rejects_short_query() {
        let request = RagRequest {
            query: "ab".into(),
            as_of: None,
            scope: None,
            ccaa_codigo: None,
            territorio: None,
            mode: RagMode::Normativo,
            top_k: 8,
            min_score: 0.0,
            include_preambulo: false,
        };
        assert!(matches!(request.validate(&ApiConfig::default()), Err(ApiError::QueryTooShort)));
    }

    #[test]
    fn rejects_autonomico_scope_without_ccaa() {
        let request = RagRequest {
            query: "impuesto sobre la renta".into(),
            as_of: None,
            scope: Some(Scope::AutonomicoMasEstatal),
            ccaa_codigo: None,
            territorio: None,
            mode: RagMode::Normativo,
            top_k: 8,
            min_score: 0.0,
            include_preambulo: false,
        };
        assert!(matches!(request.validate(&ApiConfig::default()), Err(ApiError::MissingOrInvalidCcaa)));
    }

    #[test]
    fn ranking_filters_sorts_and_truncates() {
        let low = ScoredPoint { score: 0.1, payload: payload("ARTICULO", vec![]) };
        let high = ScoredPoint { score: 0.9, payload: payload("DISPOSICION_FINAL", vec![]) };
        let ranked = rank_candidates(vec![low, high], RagMode::Vigencia, 0.5, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].unidad_tipo, "DISPOSICION_FINAL");
    }
}
