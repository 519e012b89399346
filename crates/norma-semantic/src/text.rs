//! Text normalization and unit-text composition.

use std::sync::OnceLock;

use regex::Regex;

fn xml_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("static regex is valid"))
}

/// Strip XML markup from a version's raw slice, leaving its plain-text
/// content. Best-effort: entities are not unescaped beyond the handful the
/// source API actually emits.
#[must_use]
pub fn strip_xml_tags(raw_xml: &str) -> String {
    xml_tag_re()
        .replace_all(raw_xml, " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
}

/// Collapse whitespace the way every layer of this pipeline expects:
/// CRLF/CR → LF, NBSP → space, and runs of 3+ blank lines collapsed to
/// exactly two (i.e. at most one fully blank line between paragraphs).
#[must_use]
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n").replace('\u{a0}', " ");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;
    for line in unified.split('\n') {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run <= 2 {
                out.push('\n');
            }
        } else {
            blank_run = 0;
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out.trim().to_string()
}

/// Compose a unit's text from an optional header (the root's title) and its
/// ordered child block texts, skipping parts that duplicate the
/// immediately-preceding part or are already contained verbatim within it.
#[must_use]
pub fn compose(header: Option<&str>, parts: &[String]) -> String {
    let mut pieces: Vec<String> = Vec::new();

    if let Some(h) = header {
        let normalized = normalize(h);
        if !normalized.is_empty() {
            pieces.push(normalized);
        }
    }

    for part in parts {
        let normalized = normalize(part);
        if normalized.is_empty() {
            continue;
        }
        if let Some(prev) = pieces.last() {
            if prev == &normalized || prev.contains(&normalized) {
                continue;
            }
        }
        pieces.push(normalized);
    }

    normalize(&pieces.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_crlf_and_nbsp() {
        let input = "Hola\r\nmundo\u{a0}bien";
        assert_eq!(normalize(input), "Hola\nmundo bien");
    }

    #[test]
    fn collapses_excess_blank_lines() {
        let input = "uno\n\n\n\n\ndos";
        assert_eq!(normalize(input), "uno\n\n\ndos");
    }

    #[test]
    fn composes_header_and_children() {
        let text = compose(Some("Artículo 1"), &["Primer párrafo.".to_string(), "Segundo párrafo.".to_string()]);
        assert_eq!(text, "Artículo 1\n\nPrimer párrafo.\n\nSegundo párrafo.");
    }

    #[test]
    fn skips_duplicate_consecutive_parts() {
        let text = compose(None, &["Mismo texto.".to_string(), "Mismo texto.".to_string()]);
        assert_eq!(text, "Mismo texto.");
    }

    #[test]
    fn skips_parts_already_contained_in_previous() {
        let parts = vec!["Texto largo con detalle adicional.".to_string(), "detalle adicional.".to_string()];
        let text = compose(None, &parts);
        assert_eq!(text, "Texto largo con detalle adicional.");
    }

    #[test]
    fn empty_header_and_parts_yield_empty_text() {
        assert_eq!(compose(Some(""), &[]), "");
    }

    #[test]
    fn strips_tags_and_unescapes_entities() {
        let xml = r#"<version id="x">Art&amp;culo <b>primero</b></version>"#;
        assert_eq!(strip_xml_tags(xml).trim(), "Art&culo  primero");
    }
}
