//! Indice repository — append-only snapshots with a per-norm `is_latest` flag.

use chrono::{DateTime, Utc};
use norma_core::entities::Indice;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_optional_datetime};
use crate::NormaDb;

const SELECT_COLS: &str = "id_indice, id_norma, fecha_actualizacion, fecha_actualizacion_raw, \
hash_xml, hash_pretty, file_path, is_latest, created_at, last_seen_at";

fn row_to_indice(row: &libsql::Row) -> Result<Indice, DatabaseError> {
    Ok(Indice {
        id_indice: row.get(0)?,
        id_norma: row.get(1)?,
        fecha_actualizacion: parse_optional_datetime(row.get::<Option<String>>(2)?.as_deref())?,
        fecha_actualizacion_raw: get_opt_string(row, 3)?,
        hash_xml: row.get(4)?,
        hash_pretty: row.get(5)?,
        file_path: row.get(6)?,
        is_latest: row.get::<i64>(7)? != 0,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        last_seen_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

impl NormaDb {
    pub async fn find_indice(&self, id_indice: &str) -> Result<Option<Indice>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM indices WHERE id_indice = ?1"), [id_indice])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_indice(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn latest_indice(&self, id_norma: &str) -> Result<Option<Indice>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM indices WHERE id_norma = ?1 AND is_latest = 1"),
                [id_norma],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_indice(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert a new index snapshot if its content-addressed id is unseen;
    /// touch `last_seen_at` if it already exists. Does not itself flip
    /// `is_latest` — call [`Self::mark_indice_latest`] after.
    pub async fn insert_indice_if_missing(&self, indice: &Indice) -> Result<bool, DatabaseError> {
        if self.find_indice(&indice.id_indice).await?.is_some() {
            self.touch_indice(&indice.id_indice, indice.last_seen_at).await?;
            return Ok(false);
        }
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO indices ({SELECT_COLS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)"
                ),
                libsql::params![
                    indice.id_indice.as_str(),
                    indice.id_norma.as_str(),
                    indice.fecha_actualizacion.map(|d| d.to_rfc3339()),
                    indice.fecha_actualizacion_raw.clone(),
                    indice.hash_xml.as_str(),
                    indice.hash_pretty.as_str(),
                    indice.file_path.as_str(),
                    i64::from(indice.is_latest),
                    indice.created_at.to_rfc3339(),
                    indice.last_seen_at.to_rfc3339(),
                ],
            )
            .await?;
        Ok(true)
    }

    pub async fn touch_indice(&self, id_indice: &str, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE indices SET last_seen_at = ?2 WHERE id_indice = ?1",
                libsql::params![id_indice, now.to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    /// Mark `latest_id` as the sole latest index for its norm.
    pub async fn mark_indice_latest(&self, id_norma: &str, latest_id: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE indices SET is_latest = 0 WHERE id_norma = ?1 AND id_indice != ?2",
                libsql::params![id_norma, latest_id],
            )
            .await?;
        self.conn()
            .execute(
                "UPDATE indices SET is_latest = 1 WHERE id_indice = ?1",
                libsql::params![latest_id],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, id_norma: &str) -> Indice {
        let now = Utc::now();
        Indice {
            id_indice: id.to_string(),
            id_norma: id_norma.to_string(),
            fecha_actualizacion: None,
            fecha_actualizacion_raw: Some("20260101".into()),
            hash_xml: "abc".into(),
            hash_pretty: "def".into(),
            file_path: "indices/x.xml".into(),
            is_latest: false,
            created_at: now,
            last_seen_at: now,
        }
    }

    #[tokio::test]
    async fn insert_then_mark_latest() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.insert_indice_if_missing(&sample("i1", "BOE-A-1")).await.unwrap();
        db.insert_indice_if_missing(&sample("i2", "BOE-A-1")).await.unwrap();
        db.mark_indice_latest("BOE-A-1", "i2").await.unwrap();

        let latest = db.latest_indice("BOE-A-1").await.unwrap().unwrap();
        assert_eq!(latest.id_indice, "i2");
    }

    #[tokio::test]
    async fn reinserting_same_id_is_a_noop() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let s = sample("i1", "BOE-A-1");
        assert!(db.insert_indice_if_missing(&s).await.unwrap());
        assert!(!db.insert_indice_if_missing(&s).await.unwrap());
    }
}
