//! Norma repository — `upsertFromDiscover` and lookup.

use chrono::{DateTime, Utc};
use norma_core::entities::Norma;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_optional_datetime, parse_optional_json};
use crate::NormaDb;

const SELECT_COLS: &str = "id_norma, titulo, rango_codigo, rango_texto, ambito_codigo, ambito_texto, \
departamento_codigo, departamento_texto, territorio_codigo, fecha_actualizacion, fecha_publicacion, \
fecha_disposicion, url_consolidated, raw_json, first_seen_at, last_seen_at";

fn row_to_norma(row: &libsql::Row) -> Result<Norma, DatabaseError> {
    Ok(Norma {
        id_norma: row.get(0)?,
        titulo: row.get(1)?,
        rango_codigo: get_opt_string(row, 2)?,
        rango_texto: get_opt_string(row, 3)?,
        ambito_codigo: get_opt_string(row, 4)?,
        ambito_texto: get_opt_string(row, 5)?,
        departamento_codigo: get_opt_string(row, 6)?,
        departamento_texto: get_opt_string(row, 7)?,
        territorio_codigo: row.get(8)?,
        fecha_actualizacion: parse_optional_datetime(row.get::<Option<String>>(9)?.as_deref())?,
        fecha_publicacion: parse_optional_datetime(row.get::<Option<String>>(10)?.as_deref())?,
        fecha_disposicion: parse_optional_datetime(row.get::<Option<String>>(11)?.as_deref())?,
        url_consolidated: get_opt_string(row, 12)?,
        raw_json: parse_optional_json(row.get::<Option<String>>(13)?.as_deref())?.unwrap_or(serde_json::Value::Null),
        first_seen_at: parse_datetime(&row.get::<String>(14)?)?,
        last_seen_at: parse_datetime(&row.get::<String>(15)?)?,
    })
}

/// Whether `candidate`'s structured fields differ from `existing` in any way
/// that warrants a write.
fn structured_fields_changed(existing: &Norma, candidate: &Norma) -> bool {
    existing.titulo != candidate.titulo
        || existing.rango_codigo != candidate.rango_codigo
        || existing.rango_texto != candidate.rango_texto
        || existing.ambito_codigo != candidate.ambito_codigo
        || existing.ambito_texto != candidate.ambito_texto
        || existing.departamento_codigo != candidate.departamento_codigo
        || existing.departamento_texto != candidate.departamento_texto
        || existing.territorio_codigo != candidate.territorio_codigo
        || existing.fecha_actualizacion != candidate.fecha_actualizacion
        || existing.fecha_publicacion != candidate.fecha_publicacion
        || existing.fecha_disposicion != candidate.fecha_disposicion
        || existing.url_consolidated != candidate.url_consolidated
        || existing.raw_json != candidate.raw_json
}

impl NormaDb {
    pub async fn get_norma(&self, id_norma: &str) -> Result<Norma, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM normas WHERE id_norma = ?1"), [id_norma])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_norma(&row)
    }

    pub async fn find_norma(&self, id_norma: &str) -> Result<Option<Norma>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM normas WHERE id_norma = ?1"), [id_norma])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_norma(&row)?)),
            None => Ok(None),
        }
    }

    /// Insert a newly-discovered norm, or compare-and-write structured fields
    /// on an existing one, or merely touch `last_seen_at` if nothing changed.
    /// `dry_run` computes the outcome without writing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` on query/write failure.
    pub async fn upsert_from_discover(
        &self,
        normalized: Norma,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<Norma, DatabaseError> {
        match self.find_norma(&normalized.id_norma).await? {
            None => {
                let mut created = normalized;
                created.first_seen_at = now;
                created.last_seen_at = now;
                if dry_run {
                    return Ok(created);
                }
                self.conn()
                    .execute(
                        &format!(
                            "INSERT INTO normas ({SELECT_COLS}) VALUES \
                             (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)"
                        ),
                        libsql::params![
                            created.id_norma.as_str(),
                            created.titulo.as_str(),
                            created.rango_codigo.clone(),
                            created.rango_texto.clone(),
                            created.ambito_codigo.clone(),
                            created.ambito_texto.clone(),
                            created.departamento_codigo.clone(),
                            created.departamento_texto.clone(),
                            created.territorio_codigo.clone(),
                            created.fecha_actualizacion.map(|d| d.to_rfc3339()),
                            created.fecha_publicacion.map(|d| d.to_rfc3339()),
                            created.fecha_disposicion.map(|d| d.to_rfc3339()),
                            created.url_consolidated.clone(),
                            created.raw_json.to_string(),
                            created.first_seen_at.to_rfc3339(),
                            created.last_seen_at.to_rfc3339(),
                        ],
                    )
                    .await?;
                Ok(created)
            }
            Some(existing) => {
                let mut updated = normalized;
                updated.first_seen_at = existing.first_seen_at;
                updated.last_seen_at = now;

                if !structured_fields_changed(&existing, &updated) {
                    if !dry_run {
                        self.touch_norma(&existing.id_norma, now).await?;
                    }
                    let mut touched = existing;
                    touched.last_seen_at = now;
                    return Ok(touched);
                }

                if dry_run {
                    return Ok(updated);
                }

                self.conn()
                    .execute(
                        "UPDATE normas SET titulo=?2, rango_codigo=?3, rango_texto=?4, ambito_codigo=?5, \
                         ambito_texto=?6, departamento_codigo=?7, departamento_texto=?8, territorio_codigo=?9, \
                         fecha_actualizacion=?10, fecha_publicacion=?11, fecha_disposicion=?12, \
                         url_consolidated=?13, raw_json=?14, last_seen_at=?15 WHERE id_norma=?1",
                        libsql::params![
                            updated.id_norma.as_str(),
                            updated.titulo.as_str(),
                            updated.rango_codigo.clone(),
                            updated.rango_texto.clone(),
                            updated.ambito_codigo.clone(),
                            updated.ambito_texto.clone(),
                            updated.departamento_codigo.clone(),
                            updated.departamento_texto.clone(),
                            updated.territorio_codigo.clone(),
                            updated.fecha_actualizacion.map(|d| d.to_rfc3339()),
                            updated.fecha_publicacion.map(|d| d.to_rfc3339()),
                            updated.fecha_disposicion.map(|d| d.to_rfc3339()),
                            updated.url_consolidated.clone(),
                            updated.raw_json.to_string(),
                            updated.last_seen_at.to_rfc3339(),
                        ],
                    )
                    .await?;
                Ok(updated)
            }
        }
    }

    async fn touch_norma(&self, id_norma: &str, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE normas SET last_seen_at = ?2 WHERE id_norma = ?1",
                libsql::params![id_norma, now.to_rfc3339()],
            )
            .await?;
        Ok(())
    }
}
