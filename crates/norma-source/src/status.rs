//! Extracts the source API's own embedded `status` field, independent of
//! the transport-level HTTP status.

use serde::Deserialize;

use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct JsonStatus {
    code: String,
}

#[derive(Debug, Deserialize)]
struct JsonEnvelope {
    status: JsonStatus,
}

/// Check a discover JSON body's `status.code` field equals `"200"`.
///
/// # Errors
///
/// Returns `SourceError::Parse` if the envelope can't be read, or
/// `SourceError::IntegrityMismatch` if the code isn't `"200"`.
pub fn check_json_status(body: &str) -> Result<(), SourceError> {
    let envelope: JsonEnvelope = serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;
    if envelope.status.code != "200" {
        return Err(SourceError::IntegrityMismatch { code: envelope.status.code });
    }
    Ok(())
}

/// Check an index/bloque XML body's `<status code="..."/>` attribute (or
/// child-element form) equals `"200"`. A missing `status` element is
/// treated as matching — not every fixture carries one, and only a
/// mismatching code is a hard failure.
///
/// # Errors
///
/// Returns `SourceError::IntegrityMismatch` if a status code is present and
/// isn't `"200"`.
pub fn check_xml_status(body: &str) -> Result<(), SourceError> {
    match extract_xml_status_code(body) {
        Some(code) if code != "200" => Err(SourceError::IntegrityMismatch { code }),
        _ => Ok(()),
    }
}

fn extract_xml_status_code(body: &str) -> Option<String> {
    let tag_start = body.find("<status")?;
    let tag_end = body[tag_start..].find('>').map(|i| tag_start + i)?;
    let tag = &body[tag_start..tag_end];

    if let Some(attr_start) = tag.find("code=") {
        let rest = &tag[attr_start + "code=".len()..];
        let quote = rest.chars().next()?;
        if quote == '"' || quote == '\'' {
            let rest = &rest[1..];
            let end = rest.find(quote)?;
            return Some(rest[..end].to_string());
        }
    }

    let child_start = body[tag_end..].find("<code>")? + tag_end + "<code>".len();
    let child_end = body[child_start..].find("</code>")? + child_start;
    Some(body[child_start..child_end].to_string())
}
