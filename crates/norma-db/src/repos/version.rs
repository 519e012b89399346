//! Version repository — immutable, content-addressed block revisions.

use chrono::{DateTime, Utc};
use norma_core::entities::Version;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_optional_datetime};
use crate::NormaDb;

const SELECT_COLS: &str = "id_version, id_norma, id_bloque, fecha_vigencia, fecha_vigencia_raw, \
fecha_publicacion, fecha_publicacion_raw, id_norma_modificadora, hash_xml, file_path, texto_plano, \
texto_hash, chunking_method, chunking_size, chunking_overlap, is_latest, created_at, last_seen_at";

fn row_to_version(row: &libsql::Row) -> Result<Version, DatabaseError> {
    Ok(Version {
        id_version: row.get(0)?,
        id_norma: row.get(1)?,
        id_bloque: row.get(2)?,
        fecha_vigencia: parse_optional_datetime(row.get::<Option<String>>(3)?.as_deref())?,
        fecha_vigencia_raw: get_opt_string(row, 4)?,
        fecha_publicacion: parse_optional_datetime(row.get::<Option<String>>(5)?.as_deref())?,
        fecha_publicacion_raw: get_opt_string(row, 6)?,
        id_norma_modificadora: get_opt_string(row, 7)?,
        hash_xml: row.get(8)?,
        file_path: row.get(9)?,
        texto_plano: get_opt_string(row, 10)?,
        texto_hash: get_opt_string(row, 11)?,
        chunking_method: get_opt_string(row, 12)?,
        chunking_size: row.get::<Option<i64>>(13)?,
        chunking_overlap: row.get::<Option<i64>>(14)?,
        is_latest: row.get::<i64>(15)? != 0,
        created_at: parse_datetime(&row.get::<String>(16)?)?,
        last_seen_at: parse_datetime(&row.get::<String>(17)?)?,
    })
}

impl NormaDb {
    pub async fn find_version(&self, id_version: &str) -> Result<Option<Version>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM versions WHERE id_version = ?1"), [id_version])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_version(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn latest_version(&self, id_norma: &str, id_bloque: &str) -> Result<Option<Version>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM versions WHERE id_norma = ?1 AND id_bloque = ?2 AND is_latest = 1"
                ),
                libsql::params![id_norma, id_bloque],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_version(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_versions(&self, id_norma: &str, id_bloque: &str) -> Result<Vec<Version>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM versions WHERE id_norma = ?1 AND id_bloque = ?2"),
                libsql::params![id_norma, id_bloque],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_version(&row)?);
        }
        Ok(out)
    }

    /// Insert a version if its content-addressed id is unseen. Versions are
    /// immutable once stored, so an existing one is left untouched beyond a
    /// `last_seen_at` bump.
    pub async fn insert_version_if_missing(&self, version: &Version) -> Result<bool, DatabaseError> {
        if self.find_version(&version.id_version).await?.is_some() {
            self.touch_version(&version.id_version, version.last_seen_at).await?;
            return Ok(false);
        }
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO versions ({SELECT_COLS}) VALUES \
                     (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)"
                ),
                libsql::params![
                    version.id_version.as_str(),
                    version.id_norma.as_str(),
                    version.id_bloque.as_str(),
                    version.fecha_vigencia.map(|d| d.to_rfc3339()),
                    version.fecha_vigencia_raw.clone(),
                    version.fecha_publicacion.map(|d| d.to_rfc3339()),
                    version.fecha_publicacion_raw.clone(),
                    version.id_norma_modificadora.clone(),
                    version.hash_xml.as_str(),
                    version.file_path.as_str(),
                    version.texto_plano.clone(),
                    version.texto_hash.clone(),
                    version.chunking_method.clone(),
                    version.chunking_size,
                    version.chunking_overlap,
                    i64::from(version.is_latest),
                    version.created_at.to_rfc3339(),
                    version.last_seen_at.to_rfc3339(),
                ],
            )
            .await?;
        Ok(true)
    }

    pub async fn touch_version(&self, id_version: &str, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE versions SET last_seen_at = ?2 WHERE id_version = ?1",
                libsql::params![id_version, now.to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    pub async fn mark_version_latest(&self, id_norma: &str, id_bloque: &str, latest_id: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE versions SET is_latest = 0 WHERE id_norma = ?1 AND id_bloque = ?2 AND id_version != ?3",
                libsql::params![id_norma, id_bloque, latest_id],
            )
            .await?;
        self.conn()
            .execute(
                "UPDATE versions SET is_latest = 1 WHERE id_version = ?1",
                libsql::params![latest_id],
            )
            .await?;
        Ok(())
    }

    /// Record the extracted plain text and its hash plus the chunking
    /// configuration snapshot used — the RAG-facing fields filled in after
    /// `build_units`.
    pub async fn upsert_version_rag_fields(
        &self,
        id_version: &str,
        texto_plano: &str,
        texto_hash: &str,
        chunking_method: &str,
        chunking_size: i64,
        chunking_overlap: i64,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE versions SET texto_plano=?2, texto_hash=?3, chunking_method=?4, \
                 chunking_size=?5, chunking_overlap=?6 WHERE id_version=?1",
                libsql::params![id_version, texto_plano, texto_hash, chunking_method, chunking_size, chunking_overlap],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, id_norma: &str, id_bloque: &str) -> Version {
        let now = Utc::now();
        Version {
            id_version: id.to_string(),
            id_norma: id_norma.to_string(),
            id_bloque: id_bloque.to_string(),
            fecha_vigencia: None,
            fecha_vigencia_raw: Some("20260101".into()),
            fecha_publicacion: None,
            fecha_publicacion_raw: None,
            id_norma_modificadora: None,
            hash_xml: "abc".into(),
            file_path: "versions/x.xml".into(),
            texto_plano: None,
            texto_hash: None,
            chunking_method: None,
            chunking_size: None,
            chunking_overlap: None,
            is_latest: false,
            created_at: now,
            last_seen_at: now,
        }
    }

    #[tokio::test]
    async fn insert_then_mark_latest_and_fill_rag_fields() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.insert_version_if_missing(&sample("v1", "BOE-A-1", "a1")).await.unwrap();
        db.insert_version_if_missing(&sample("v2", "BOE-A-1", "a1")).await.unwrap();
        db.mark_version_latest("BOE-A-1", "a1", "v2").await.unwrap();

        let latest = db.latest_version("BOE-A-1", "a1").await.unwrap().unwrap();
        assert_eq!(latest.id_version, "v2");

        db.upsert_version_rag_fields("v2", "texto", "hash123", "recursive", 1000, 100)
            .await
            .unwrap();
        let reloaded = db.find_version("v2").await.unwrap().unwrap();
        assert_eq!(reloaded.texto_plano.as_deref(), Some("texto"));
        assert_eq!(reloaded.chunking_size, Some(1000));
    }

    #[tokio::test]
    async fn reinsert_is_immutable_noop() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let v = sample("v1", "BOE-A-1", "a1");
        assert!(db.insert_version_if_missing(&v).await.unwrap());
        assert!(!db.insert_version_if_missing(&v).await.unwrap());
    }
}
