//! Path segment sanitization and the object store's layout contract:
//!
//! ```text
//! <root>/normas/<id_norma>/indice/<date_token>__<hash8>.xml
//! <root>/normas/<id_norma>/bloques/<id_bloque>/versions/<vigencia>__<publicacion|NA>__<hash8>.xml
//! <root>/normas/<id_norma>/bloques/<id_bloque>/raw/<timestamp>.xml
//! ```

use std::path::PathBuf;

/// Replace any byte outside `[A-Za-z0-9._-]` with `_`.
#[must_use]
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[must_use]
pub fn indice_relative_path(id_norma: &str, date_token: &str, hash8: &str) -> PathBuf {
    PathBuf::from("normas")
        .join(sanitize_segment(id_norma))
        .join("indice")
        .join(format!(
            "{}__{}.xml",
            sanitize_segment(date_token),
            sanitize_segment(hash8)
        ))
}

#[must_use]
pub fn version_relative_path(
    id_norma: &str,
    id_bloque: &str,
    vigencia_token: &str,
    publicacion_token: Option<&str>,
    hash8: &str,
) -> PathBuf {
    let publicacion = publicacion_token.unwrap_or("NA");
    PathBuf::from("normas")
        .join(sanitize_segment(id_norma))
        .join("bloques")
        .join(sanitize_segment(id_bloque))
        .join("versions")
        .join(format!(
            "{}__{}__{}.xml",
            sanitize_segment(vigencia_token),
            sanitize_segment(publicacion),
            sanitize_segment(hash8)
        ))
}

#[must_use]
pub fn raw_relative_path(id_norma: &str, id_bloque: &str, timestamp_token: &str) -> PathBuf {
    PathBuf::from("normas")
        .join(sanitize_segment(id_norma))
        .join("bloques")
        .join(sanitize_segment(id_bloque))
        .join("raw")
        .join(format!("{}.xml", sanitize_segment(timestamp_token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_segment("BOE-A/2015:10566"), "BOE-A_2015_10566");
        assert_eq!(sanitize_segment("a.b_c-9"), "a.b_c-9");
    }

    #[test]
    fn indice_path_has_expected_shape() {
        let path = indice_relative_path("BOE-A-2015-10566", "2022-11-15", "abcd1234");
        assert_eq!(
            path,
            PathBuf::from("normas/BOE-A-2015-10566/indice/2022-11-15__abcd1234.xml")
        );
    }

    #[test]
    fn version_path_falls_back_to_na_publicacion() {
        let path = version_relative_path("BOE-A-1", "blq1", "2020-01-01", None, "ffff0000");
        assert_eq!(
            path,
            PathBuf::from("normas/BOE-A-1/bloques/blq1/versions/2020-01-01__NA__ffff0000.xml")
        );
    }
}
