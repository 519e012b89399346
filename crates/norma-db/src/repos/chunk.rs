//! ChunkSemantico repository — text fragments produced from units for vector search.

use norma_core::entities::{ChunkMetadataSnapshot, ChunkSemantico, ChunkingConfig};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_json_column, to_json_column};
use crate::NormaDb;

const SELECT_COLS: &str = "id_chunk, id_unidad, id_norma, chunk_index, texto, texto_hash, \
chunking_hash, chunking_json, metadata_json, created_at, last_seen_at";

fn row_to_chunk(row: &libsql::Row) -> Result<ChunkSemantico, DatabaseError> {
    Ok(ChunkSemantico {
        id_chunk: row.get(0)?,
        id_unidad: row.get(1)?,
        id_norma: row.get(2)?,
        chunk_index: row.get(3)?,
        texto: row.get(4)?,
        texto_hash: row.get(5)?,
        chunking_hash: row.get(6)?,
        chunking: parse_json_column::<ChunkingConfig>(&row.get::<String>(7)?)?,
        metadata: parse_json_column::<ChunkMetadataSnapshot>(&row.get::<String>(8)?)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        last_seen_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl NormaDb {
    pub async fn find_chunk(&self, id_chunk: &str) -> Result<Option<ChunkSemantico>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM chunks_semanticos WHERE id_chunk = ?1"), [id_chunk])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_chunk(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_chunks_for_unidad(&self, id_unidad: &str) -> Result<Vec<ChunkSemantico>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM chunks_semanticos WHERE id_unidad = ?1 ORDER BY chunk_index"),
                [id_unidad],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_chunk(&row)?);
        }
        Ok(out)
    }

    /// Stream every chunk in `(id_norma, id_unidad, chunk_index)` order, optionally
    /// scoped to one norm — the order the indexer batches its embed/upsert pass in.
    pub async fn list_chunks_ordered(&self, id_norma: Option<&str>) -> Result<Vec<ChunkSemantico>, DatabaseError> {
        let sql = match id_norma {
            Some(_) => format!(
                "SELECT {SELECT_COLS} FROM chunks_semanticos WHERE id_norma = ?1 ORDER BY id_norma, id_unidad, chunk_index"
            ),
            None => format!("SELECT {SELECT_COLS} FROM chunks_semanticos ORDER BY id_norma, id_unidad, chunk_index"),
        };
        let mut rows = match id_norma {
            Some(id) => self.conn().query(&sql, [id]).await?,
            None => self.conn().query(&sql, ()).await?,
        };
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_chunk(&row)?);
        }
        Ok(out)
    }

    pub async fn upsert_chunk(&self, chunk: &ChunkSemantico) -> Result<(), DatabaseError> {
        let chunking_json = to_json_column(&chunk.chunking)?;
        let metadata_json = to_json_column(&chunk.metadata)?;

        if self.find_chunk(&chunk.id_chunk).await?.is_some() {
            self.conn()
                .execute(
                    "UPDATE chunks_semanticos SET texto=?2, texto_hash=?3, chunking_hash=?4, chunking_json=?5, \
                     metadata_json=?6, last_seen_at=?7 WHERE id_chunk=?1",
                    libsql::params![
                        chunk.id_chunk.as_str(),
                        chunk.texto.as_str(),
                        chunk.texto_hash.as_str(),
                        chunk.chunking_hash.as_str(),
                        chunking_json,
                        metadata_json,
                        chunk.last_seen_at.to_rfc3339(),
                    ],
                )
                .await?;
        } else {
            self.conn()
                .execute(
                    &format!(
                        "INSERT INTO chunks_semanticos ({SELECT_COLS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)"
                    ),
                    libsql::params![
                        chunk.id_chunk.as_str(),
                        chunk.id_unidad.as_str(),
                        chunk.id_norma.as_str(),
                        chunk.chunk_index,
                        chunk.texto.as_str(),
                        chunk.texto_hash.as_str(),
                        chunk.chunking_hash.as_str(),
                        chunking_json,
                        metadata_json,
                        chunk.created_at.to_rfc3339(),
                        chunk.last_seen_at.to_rfc3339(),
                    ],
                )
                .await?;
        }
        Ok(())
    }

    /// Delete chunks of a unit produced under a stale `chunking_hash`, or not
    /// present in `keep_ids` for the current one — the cleanup step after
    /// re-chunking.
    pub async fn delete_chunks_not_in(
        &self,
        id_unidad: &str,
        chunking_hash: &str,
        keep_ids: &[String],
    ) -> Result<u64, DatabaseError> {
        if keep_ids.is_empty() {
            return Ok(self
                .conn()
                .execute(
                    "DELETE FROM chunks_semanticos WHERE id_unidad = ?1 AND chunking_hash = ?2",
                    libsql::params![id_unidad, chunking_hash],
                )
                .await?);
        }
        let placeholders: Vec<String> = (3..=keep_ids.len() + 2).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "DELETE FROM chunks_semanticos WHERE id_unidad = ?1 AND chunking_hash = ?2 AND id_chunk NOT IN ({})",
            placeholders.join(",")
        );
        let mut params: Vec<libsql::Value> = vec![
            libsql::Value::Text(id_unidad.to_string()),
            libsql::Value::Text(chunking_hash.to_string()),
        ];
        params.extend(keep_ids.iter().map(|id| libsql::Value::Text(id.clone())));
        Ok(self.conn().execute(&sql, params).await?)
    }

    /// Delete every chunk belonging to units outside `chunking_hash` for a
    /// given unit — used when a unit's chunking config changes and all old
    /// chunks must be invalidated outright.
    pub async fn delete_chunks_with_stale_hash(&self, id_unidad: &str, current_hash: &str) -> Result<u64, DatabaseError> {
        Ok(self
            .conn()
            .execute(
                "DELETE FROM chunks_semanticos WHERE id_unidad = ?1 AND chunking_hash != ?2",
                libsql::params![id_unidad, current_hash],
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use norma_core::enums::ChunkMethod;

    fn sample(id: &str, id_unidad: &str, index: i64) -> ChunkSemantico {
        let now = chrono::Utc::now();
        ChunkSemantico {
            id_chunk: id.to_string(),
            id_unidad: id_unidad.to_string(),
            id_norma: "BOE-A-1".into(),
            chunk_index: index,
            texto: "fragmento".into(),
            texto_hash: "hash".into(),
            chunking_hash: "chash1".into(),
            chunking: ChunkingConfig {
                method: ChunkMethod::Recursive,
                size: 1000,
                overlap: 100,
            },
            metadata: ChunkMetadataSnapshot::default(),
            created_at: now,
            last_seen_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_list_ordered_by_index() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.upsert_chunk(&sample("c2", "u1", 1)).await.unwrap();
        db.upsert_chunk(&sample("c1", "u1", 0)).await.unwrap();
        let chunks = db.list_chunks_for_unidad("u1").await.unwrap();
        assert_eq!(chunks.iter().map(|c| c.id_chunk.clone()).collect::<Vec<_>>(), vec!["c1", "c2"]);
    }

    #[tokio::test]
    async fn ordered_stream_spans_units_and_filters_by_norma() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.upsert_chunk(&sample("c1", "u2", 0)).await.unwrap();
        db.upsert_chunk(&sample("c2", "u1", 1)).await.unwrap();
        db.upsert_chunk(&sample("c3", "u1", 0)).await.unwrap();

        let all = db.list_chunks_ordered(None).await.unwrap();
        assert_eq!(all.iter().map(|c| c.id_chunk.clone()).collect::<Vec<_>>(), vec!["c3", "c2", "c1"]);

        let scoped = db.list_chunks_ordered(Some("BOE-A-1")).await.unwrap();
        assert_eq!(scoped.len(), 3);
    }

    #[tokio::test]
    async fn cleanup_removes_unkept_chunks() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.upsert_chunk(&sample("c1", "u1", 0)).await.unwrap();
        db.upsert_chunk(&sample("c2", "u1", 1)).await.unwrap();
        db.delete_chunks_not_in("u1", "chash1", &["c1".to_string()]).await.unwrap();
        assert!(db.find_chunk("c1").await.unwrap().is_some());
        assert!(db.find_chunk("c2").await.unwrap().is_none());
    }
}
