//! # norma-store
//!
//! Content-addressed filesystem object store for raw/pretty XML snapshots of
//! indices and versions. Writes are create-exclusive: an existing target file
//! is left untouched, and an "already exists" failure is treated as success.
//! Both raw and pretty-printed forms are hashed; the pretty form is what is
//! persisted. There are no deletes — the store is append-only.

pub mod error;
pub mod path;
pub mod pretty;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use norma_core::ids::{content_hash_str, short_hash8};

pub use error::StoreError;

/// Outcome of a single object-store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
    pub exists: bool,
    pub written: bool,
    pub raw_hash: String,
    pub pretty_hash: String,
    pub pretty_xml: String,
}

#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write_indice(
        &self,
        id_norma: &str,
        date_token: &str,
        raw_xml: &str,
    ) -> Result<WriteResult, StoreError> {
        let raw_hash = content_hash_str(raw_xml);
        let hash8 = short_hash8(&raw_hash);
        let relative = path::indice_relative_path(id_norma, date_token, hash8);
        self.write_at(relative, raw_xml)
    }

    pub fn write_version(
        &self,
        id_norma: &str,
        id_bloque: &str,
        vigencia_token: &str,
        publicacion_token: Option<&str>,
        raw_xml: &str,
    ) -> Result<WriteResult, StoreError> {
        let raw_hash = content_hash_str(raw_xml);
        let hash8 = short_hash8(&raw_hash);
        let relative = path::version_relative_path(
            id_norma,
            id_bloque,
            vigencia_token,
            publicacion_token,
            hash8,
        );
        self.write_at(relative, raw_xml)
    }

    pub fn write_raw_snapshot(
        &self,
        id_norma: &str,
        id_bloque: &str,
        timestamp_token: &str,
        raw_xml: &str,
    ) -> Result<WriteResult, StoreError> {
        let relative = path::raw_relative_path(id_norma, id_bloque, timestamp_token);
        self.write_at(relative, raw_xml)
    }

    fn write_at(&self, relative: PathBuf, raw_xml: &str) -> Result<WriteResult, StoreError> {
        let raw_hash = content_hash_str(raw_xml);
        let pretty_xml = pretty::pretty_print_xml(raw_xml);
        let pretty_hash = content_hash_str(&pretty_xml);

        let absolute = self.root.join(&relative);
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let written = match OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&absolute)
        {
            Ok(mut file) => {
                file.write_all(pretty_xml.as_bytes())
                    .map_err(|source| StoreError::Io {
                        path: absolute.clone(),
                        source,
                    })?;
                true
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => false,
            Err(source) => {
                return Err(StoreError::Io {
                    path: absolute,
                    source,
                })
            }
        };

        Ok(WriteResult {
            exists: absolute.exists(),
            absolute_path: absolute,
            relative_path: relative,
            written,
            raw_hash,
            pretty_hash,
            pretty_xml,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_indice_creates_file_and_reports_hashes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let raw = "<response><data><bloque id=\"a\"/></data></response>";

        let result = store.write_indice("BOE-A-1", "2022-11-15", raw).unwrap();
        assert!(result.written);
        assert!(result.exists);
        assert!(result.absolute_path.is_file());
        assert!(!result.raw_hash.is_empty());
        assert!(!result.pretty_hash.is_empty());
    }

    #[test]
    fn repeated_write_is_a_noop_and_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let raw = "<response/>";

        let first = store.write_indice("BOE-A-1", "2022-11-15", raw).unwrap();
        let second = store.write_indice("BOE-A-1", "2022-11-15", raw).unwrap();

        assert!(first.written);
        assert!(!second.written);
        assert!(second.exists);
        assert_eq!(first.relative_path, second.relative_path);
    }

    #[test]
    fn write_version_nests_under_bloques_and_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());
        let result = store
            .write_version("BOE-A-1", "blq1", "2020-01-01", Some("2019-12-20"), "<v/>")
            .unwrap();

        assert!(result
            .relative_path
            .to_string_lossy()
            .contains("bloques/blq1/versions"));
    }
}
