//! Unidad repository — retrieval units, one row per `(lineage, anchor)`.

use chrono::{DateTime, Utc};
use norma_core::entities::{Quality, Unidad, UnidadMetadata, UnidadSource};
use norma_core::enums::UnidadTipo;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_json_column, to_json_column};
use crate::NormaDb;

const SELECT_COLS: &str = "id_unidad, id_norma, unidad_tipo, unidad_ref, titulo, orden, \
fecha_vigencia_desde, fecha_vigencia_hasta, fecha_publicacion_mod, id_norma_modificadora, texto_plano, \
texto_hash, source_json, metadata_json, quality_json, lineage_key, is_latest, created_at, last_seen_at";

fn row_to_unidad(row: &libsql::Row) -> Result<Unidad, DatabaseError> {
    Ok(Unidad {
        id_unidad: row.get(0)?,
        id_norma: row.get(1)?,
        unidad_tipo: parse_enum::<UnidadTipo>(&row.get::<String>(2)?)?,
        unidad_ref: row.get(3)?,
        titulo: get_opt_string(row, 4)?,
        orden: row.get(5)?,
        fecha_vigencia_desde: crate::helpers::parse_optional_datetime(row.get::<Option<String>>(6)?.as_deref())?,
        fecha_vigencia_hasta: crate::helpers::parse_optional_datetime(row.get::<Option<String>>(7)?.as_deref())?,
        fecha_publicacion_mod: crate::helpers::parse_optional_datetime(row.get::<Option<String>>(8)?.as_deref())?,
        id_norma_modificadora: get_opt_string(row, 9)?,
        texto_plano: row.get(10)?,
        texto_hash: row.get(11)?,
        source: parse_json_column::<UnidadSource>(&row.get::<String>(12)?)?,
        metadata: parse_json_column::<UnidadMetadata>(&row.get::<String>(13)?)?,
        quality: parse_json_column::<Quality>(&row.get::<String>(14)?)?,
        lineage_key: row.get(15)?,
        is_latest: row.get::<i64>(16)? != 0,
        created_at: parse_datetime(&row.get::<String>(17)?)?,
        last_seen_at: parse_datetime(&row.get::<String>(18)?)?,
    })
}

impl NormaDb {
    pub async fn find_unidad(&self, id_unidad: &str) -> Result<Option<Unidad>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM unidades WHERE id_unidad = ?1"), [id_unidad])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_unidad(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_unidades_by_lineage(&self, lineage_key: &str) -> Result<Vec<Unidad>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM unidades WHERE lineage_key = ?1 ORDER BY orden"),
                [lineage_key],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_unidad(&row)?);
        }
        Ok(out)
    }

    /// Distinct lineage keys for a norm — the recomputation unit for the
    /// vigencia engine after a new version lands.
    pub async fn distinct_lineage_keys(&self, id_norma: &str) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT DISTINCT lineage_key FROM unidades WHERE id_norma = ?1", [id_norma])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row.get::<String>(0)?);
        }
        Ok(out)
    }

    pub async fn upsert_unidad(&self, unidad: &Unidad) -> Result<(), DatabaseError> {
        let source_json = to_json_column(&unidad.source)?;
        let metadata_json = to_json_column(&unidad.metadata)?;
        let quality_json = to_json_column(&unidad.quality)?;

        if self.find_unidad(&unidad.id_unidad).await?.is_some() {
            self.conn()
                .execute(
                    "UPDATE unidades SET titulo=?2, orden=?3, fecha_vigencia_desde=?4, fecha_vigencia_hasta=?5, \
                     fecha_publicacion_mod=?6, id_norma_modificadora=?7, texto_plano=?8, texto_hash=?9, \
                     source_json=?10, metadata_json=?11, quality_json=?12, lineage_key=?13, is_latest=?14, \
                     last_seen_at=?15 WHERE id_unidad=?1",
                    libsql::params![
                        unidad.id_unidad.as_str(),
                        unidad.titulo.clone(),
                        unidad.orden,
                        unidad.fecha_vigencia_desde.map(|d| d.to_rfc3339()),
                        unidad.fecha_vigencia_hasta.map(|d| d.to_rfc3339()),
                        unidad.fecha_publicacion_mod.map(|d| d.to_rfc3339()),
                        unidad.id_norma_modificadora.clone(),
                        unidad.texto_plano.as_str(),
                        unidad.texto_hash.as_str(),
                        source_json,
                        metadata_json,
                        quality_json,
                        unidad.lineage_key.as_str(),
                        i64::from(unidad.is_latest),
                        unidad.last_seen_at.to_rfc3339(),
                    ],
                )
                .await?;
        } else {
            self.conn()
                .execute(
                    &format!(
                        "INSERT INTO unidades ({SELECT_COLS}) VALUES \
                         (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19)"
                    ),
                    libsql::params![
                        unidad.id_unidad.as_str(),
                        unidad.id_norma.as_str(),
                        unidad.unidad_tipo.as_str(),
                        unidad.unidad_ref.as_str(),
                        unidad.titulo.clone(),
                        unidad.orden,
                        unidad.fecha_vigencia_desde.map(|d| d.to_rfc3339()),
                        unidad.fecha_vigencia_hasta.map(|d| d.to_rfc3339()),
                        unidad.fecha_publicacion_mod.map(|d| d.to_rfc3339()),
                        unidad.id_norma_modificadora.clone(),
                        unidad.texto_plano.as_str(),
                        unidad.texto_hash.as_str(),
                        source_json,
                        metadata_json,
                        quality_json,
                        unidad.lineage_key.as_str(),
                        i64::from(unidad.is_latest),
                        unidad.created_at.to_rfc3339(),
                        unidad.last_seen_at.to_rfc3339(),
                    ],
                )
                .await?;
        }
        Ok(())
    }

    /// Set `fecha_vigencia_hasta` for all but the most recent entry in a
    /// lineage and flip `is_latest` accordingly — the vigencia engine's
    /// write-back step.
    pub async fn apply_vigencia_closure(
        &self,
        lineage_key: &str,
        closures: &[(String, Option<DateTime<Utc>>, bool)],
    ) -> Result<(), DatabaseError> {
        for (id_unidad, hasta, is_latest) in closures {
            self.conn()
                .execute(
                    "UPDATE unidades SET fecha_vigencia_hasta=?2, is_latest=?3 WHERE id_unidad=?1 AND lineage_key=?4",
                    libsql::params![
                        id_unidad.as_str(),
                        hasta.map(|d| d.to_rfc3339()),
                        i64::from(*is_latest),
                        lineage_key,
                    ],
                )
                .await?;
        }
        Ok(())
    }

    /// Delete units of a lineage that are not in `keep_ids` — garbage
    /// collection after a lineage is rebuilt from fewer anchors.
    pub async fn delete_unidades_not_in(&self, lineage_key: &str, keep_ids: &[String]) -> Result<u64, DatabaseError> {
        if keep_ids.is_empty() {
            return Ok(self
                .conn()
                .execute("DELETE FROM unidades WHERE lineage_key = ?1", [lineage_key])
                .await?);
        }
        let placeholders: Vec<String> = (2..=keep_ids.len() + 1).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "DELETE FROM unidades WHERE lineage_key = ?1 AND id_unidad NOT IN ({})",
            placeholders.join(",")
        );
        let mut params: Vec<libsql::Value> = vec![libsql::Value::Text(lineage_key.to_string())];
        params.extend(keep_ids.iter().map(|id| libsql::Value::Text(id.clone())));
        Ok(self.conn().execute(&sql, params).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, id_norma: &str, lineage: &str, orden: i64) -> Unidad {
        let now = Utc::now();
        Unidad {
            id_unidad: id.to_string(),
            id_norma: id_norma.to_string(),
            unidad_tipo: UnidadTipo::Articulo,
            unidad_ref: "1".into(),
            titulo: Some("Articulo 1".into()),
            orden,
            fecha_vigencia_desde: None,
            fecha_vigencia_hasta: None,
            fecha_publicacion_mod: None,
            id_norma_modificadora: None,
            texto_plano: "texto".into(),
            texto_hash: "hash".into(),
            source: UnidadSource::default(),
            metadata: UnidadMetadata::default(),
            quality: Quality::default(),
            lineage_key: lineage.to_string(),
            is_latest: false,
            created_at: now,
            last_seen_at: now,
        }
    }

    #[tokio::test]
    async fn insert_then_update_roundtrips_json_columns() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.upsert_unidad(&sample("u1", "BOE-A-1", "lin1", 0)).await.unwrap();
        let reloaded = db.find_unidad("u1").await.unwrap().unwrap();
        assert_eq!(reloaded.unidad_tipo, UnidadTipo::Articulo);
        assert_eq!(reloaded.texto_plano, "texto");
    }

    #[tokio::test]
    async fn lineage_listing_is_ordered() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.upsert_unidad(&sample("u2", "BOE-A-1", "lin1", 1)).await.unwrap();
        db.upsert_unidad(&sample("u1", "BOE-A-1", "lin1", 0)).await.unwrap();
        let units = db.list_unidades_by_lineage("lin1").await.unwrap();
        assert_eq!(units.iter().map(|u| u.id_unidad.clone()).collect::<Vec<_>>(), vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn gc_deletes_unkept_ids() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.upsert_unidad(&sample("u1", "BOE-A-1", "lin1", 0)).await.unwrap();
        db.upsert_unidad(&sample("u2", "BOE-A-1", "lin1", 1)).await.unwrap();
        db.delete_unidades_not_in("lin1", &["u1".to_string()]).await.unwrap();
        assert!(db.find_unidad("u1").await.unwrap().is_some());
        assert!(db.find_unidad("u2").await.unwrap().is_none());
    }
}
