//! Endpoint URL building: `{base}` is a full URL and is never
//! percent-encoded; every other placeholder is encoded before interpolation.

/// Build `{base}/id/{id_norma}/texto/indice`.
#[must_use]
pub fn index_url(base: &str, id_norma: &str) -> String {
    format!("{}/id/{}/texto/indice", base.trim_end_matches('/'), urlencoding::encode(id_norma))
}

/// Build `{base}/id/{id_norma}/texto/bloque/{id_bloque}`.
#[must_use]
pub fn bloque_url(base: &str, id_norma: &str, id_bloque: &str) -> String {
    format!(
        "{}/id/{}/texto/bloque/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(id_norma),
        urlencoding::encode(id_bloque)
    )
}

/// Build the discover query URL: `{base}?from&to&offset&limit&query`. Only
/// params that are `Some` are appended.
#[must_use]
pub fn discover_url(base: &str, from: Option<&str>, to: Option<&str>, offset: Option<u64>, limit: Option<u64>, query: Option<&str>) -> String {
    let mut pairs = Vec::new();
    if let Some(v) = from {
        pairs.push(format!("from={}", urlencoding::encode(v)));
    }
    if let Some(v) = to {
        pairs.push(format!("to={}", urlencoding::encode(v)));
    }
    if let Some(v) = offset {
        pairs.push(format!("offset={v}"));
    }
    if let Some(v) = limit {
        pairs.push(format!("limit={v}"));
    }
    if let Some(v) = query {
        pairs.push(format!("query={}", urlencoding::encode(v)));
    }
    let base = base.trim_end_matches('/');
    if pairs.is_empty() { base.to_string() } else { format!("{base}?{}", pairs.join("&")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_url_encodes_id_and_strips_trailing_slash() {
        let url = index_url("https://example.org/api/", "BOE-A/2015");
        assert_eq!(url, "https://example.org/api/id/BOE-A%2F2015/texto/indice");
    }

    #[test]
    fn bloque_url_encodes_both_ids() {
        let url = bloque_url("https://example.org/api", "BOE-A-1", "bloque 1");
        assert_eq!(url, "https://example.org/api/id/BOE-A-1/texto/bloque/bloque%201");
    }

    #[test]
    fn discover_url_appends_only_present_params() {
        let url = discover_url("https://example.org/api", Some("20200101"), None, Some(10), Some(50), None);
        assert_eq!(url, "https://example.org/api?from=20200101&offset=10&limit=50");
    }

    #[test]
    fn discover_url_with_no_params_is_bare_base() {
        assert_eq!(discover_url("https://example.org/api", None, None, None, None, None), "https://example.org/api");
    }

    #[test]
    fn discover_url_encodes_query() {
        let url = discover_url("https://example.org/api", None, None, None, None, Some("ley & orden"));
        assert_eq!(url, "https://example.org/api?query=ley%20%26%20orden");
    }
}
