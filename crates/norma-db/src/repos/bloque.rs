//! Bloque repository — sections of a norm, upserted from each index sync.

use chrono::{DateTime, Utc};
use norma_core::entities::Bloque;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::NormaDb;

const SELECT_COLS: &str = "id_bloque_row, id_norma, id_bloque, tipo, titulo, fecha_actualizacion_raw, \
url, latest_version_id, created_at, last_seen_at";

fn row_to_bloque(row: &libsql::Row) -> Result<Bloque, DatabaseError> {
    Ok(Bloque {
        id_bloque_row: row.get(0)?,
        id_norma: row.get(1)?,
        id_bloque: row.get(2)?,
        tipo: get_opt_string(row, 3)?,
        titulo: row.get(4)?,
        fecha_actualizacion_raw: get_opt_string(row, 5)?,
        url: get_opt_string(row, 6)?,
        latest_version_id: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        last_seen_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

impl NormaDb {
    pub async fn find_bloque(&self, id_norma: &str, id_bloque: &str) -> Result<Option<Bloque>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM bloques WHERE id_norma = ?1 AND id_bloque = ?2"),
                libsql::params![id_norma, id_bloque],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_bloque(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_bloques(&self, id_norma: &str) -> Result<Vec<Bloque>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM bloques WHERE id_norma = ?1"), [id_norma])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_bloque(&row)?);
        }
        Ok(out)
    }

    /// Insert a new block, or update its dirty-detected fields (`tipo`,
    /// `titulo`, `fecha_actualizacion_raw`, `url`) when they diverge from the
    /// index, or just touch `last_seen_at` when nothing changed.
    pub async fn upsert_bloque(&self, candidate: &Bloque, now: DateTime<Utc>) -> Result<bool, DatabaseError> {
        match self.find_bloque(&candidate.id_norma, &candidate.id_bloque).await? {
            None => {
                self.conn()
                    .execute(
                        &format!("INSERT INTO bloques ({SELECT_COLS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)"),
                        libsql::params![
                            candidate.id_bloque_row.as_str(),
                            candidate.id_norma.as_str(),
                            candidate.id_bloque.as_str(),
                            candidate.tipo.clone(),
                            candidate.titulo.as_str(),
                            candidate.fecha_actualizacion_raw.clone(),
                            candidate.url.clone(),
                            candidate.latest_version_id.clone(),
                            now.to_rfc3339(),
                            now.to_rfc3339(),
                        ],
                    )
                    .await?;
                Ok(true)
            }
            Some(existing) => {
                let changed = existing.tipo != candidate.tipo
                    || existing.titulo != candidate.titulo
                    || existing.fecha_actualizacion_raw != candidate.fecha_actualizacion_raw
                    || existing.url != candidate.url;
                if changed {
                    self.conn()
                        .execute(
                            "UPDATE bloques SET tipo=?3, titulo=?4, fecha_actualizacion_raw=?5, url=?6, \
                             last_seen_at=?7 WHERE id_norma=?1 AND id_bloque=?2",
                            libsql::params![
                                candidate.id_norma.as_str(),
                                candidate.id_bloque.as_str(),
                                candidate.tipo.clone(),
                                candidate.titulo.as_str(),
                                candidate.fecha_actualizacion_raw.clone(),
                                candidate.url.clone(),
                                now.to_rfc3339(),
                            ],
                        )
                        .await?;
                } else {
                    self.conn()
                        .execute(
                            "UPDATE bloques SET last_seen_at=?3 WHERE id_norma=?1 AND id_bloque=?2",
                            libsql::params![candidate.id_norma.as_str(), candidate.id_bloque.as_str(), now.to_rfc3339()],
                        )
                        .await?;
                }
                Ok(changed)
            }
        }
    }

    pub async fn set_bloque_latest_version(
        &self,
        id_norma: &str,
        id_bloque: &str,
        id_version: &str,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE bloques SET latest_version_id = ?3 WHERE id_norma = ?1 AND id_bloque = ?2",
                libsql::params![id_norma, id_bloque, id_version],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id_norma: &str, id_bloque: &str, titulo: &str) -> Bloque {
        let now = Utc::now();
        Bloque {
            id_bloque_row: format!("{id_norma}:{id_bloque}"),
            id_norma: id_norma.to_string(),
            id_bloque: id_bloque.to_string(),
            tipo: Some("articulo".into()),
            titulo: titulo.to_string(),
            fecha_actualizacion_raw: Some("20260101".into()),
            url: None,
            latest_version_id: None,
            created_at: now,
            last_seen_at: now,
        }
    }

    #[tokio::test]
    async fn insert_then_update_on_change() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let now = Utc::now();
        assert!(db.upsert_bloque(&sample("BOE-A-1", "a1", "Articulo 1"), now).await.unwrap());

        let later = now + chrono::Duration::hours(1);
        let changed = db
            .upsert_bloque(&sample("BOE-A-1", "a1", "Articulo 1 bis"), later)
            .await
            .unwrap();
        assert!(changed);

        let reloaded = db.find_bloque("BOE-A-1", "a1").await.unwrap().unwrap();
        assert_eq!(reloaded.titulo, "Articulo 1 bis");
    }

    #[tokio::test]
    async fn touch_only_when_unchanged() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let now = Utc::now();
        db.upsert_bloque(&sample("BOE-A-1", "a1", "Articulo 1"), now).await.unwrap();
        let later = now + chrono::Duration::hours(1);
        let changed = db.upsert_bloque(&sample("BOE-A-1", "a1", "Articulo 1"), later).await.unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn set_latest_version() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let now = Utc::now();
        db.upsert_bloque(&sample("BOE-A-1", "a1", "Articulo 1"), now).await.unwrap();
        db.set_bloque_latest_version("BOE-A-1", "a1", "v1").await.unwrap();
        let reloaded = db.find_bloque("BOE-A-1", "a1").await.unwrap().unwrap();
        assert_eq!(reloaded.latest_version_id.as_deref(), Some("v1"));
    }
}
