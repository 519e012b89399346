//! Best-effort XML pretty-printing. On any parse error the raw input is
//! returned unchanged — the stored bytes remain semantically identical
//! either way, only the formatting is best-effort.

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

#[must_use]
pub fn pretty_print_xml(raw: &str) -> String {
    try_pretty_print(raw).unwrap_or_else(|| raw.to_string())
}

fn try_pretty_print(raw: &str) -> Option<String> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text = true;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event().ok()? {
            Event::Eof => break,
            event => writer.write_event(event).ok()?,
        }
    }

    String::from_utf8(writer.into_inner()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_nested_elements() {
        let raw = "<response><status code=\"200\"/><data><bloque id=\"a\"/></data></response>";
        let pretty = pretty_print_xml(raw);
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("<bloque"));
    }

    #[test]
    fn falls_back_to_raw_on_malformed_input() {
        let raw = "<response><unterminated";
        assert_eq!(pretty_print_xml(raw), raw);
    }
}
