//! TerritorioCatalog repository — geographic scope lookup table.

use norma_core::entities::TerritorioCatalog;
use norma_core::enums::TerritorioTipo;

use crate::error::DatabaseError;
use crate::helpers::get_opt_string;
use crate::NormaDb;

const SELECT_COLS: &str = "codigo, nombre, tipo, departamento_codigo";

fn row_to_territorio(row: &libsql::Row) -> Result<TerritorioCatalog, DatabaseError> {
    let tipo_raw: String = row.get(2)?;
    let tipo = match tipo_raw.as_str() {
        "ESTATAL" => TerritorioTipo::Estatal,
        "AUTONOMICO" => TerritorioTipo::Autonomico,
        other => return Err(DatabaseError::Query(format!("unknown territorio tipo '{other}'"))),
    };
    Ok(TerritorioCatalog {
        codigo: row.get(0)?,
        nombre: row.get(1)?,
        tipo,
        departamento_codigo: get_opt_string(row, 3)?,
    })
}

impl NormaDb {
    pub async fn find_territorio(&self, codigo: &str) -> Result<Option<TerritorioCatalog>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM territorio_catalog WHERE codigo = ?1"), [codigo])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_territorio(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_territorios(&self) -> Result<Vec<TerritorioCatalog>, DatabaseError> {
        let mut rows = self.conn().query(&format!("SELECT {SELECT_COLS} FROM territorio_catalog"), ()).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_territorio(&row)?);
        }
        Ok(out)
    }

    /// List catalog entries of one `tipo` (e.g. the `AUTONOMICO` ones for a
    /// CCAA picker).
    pub async fn list_by_tipo(&self, tipo: TerritorioTipo) -> Result<Vec<TerritorioCatalog>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM territorio_catalog WHERE tipo = ?1"), [tipo.to_string()])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_territorio(&row)?);
        }
        Ok(out)
    }

    /// Insert or refresh a catalog entry. Always safe to call — catalog
    /// entries are small and never carry provenance worth diffing.
    pub async fn upsert_territorio(&self, entry: &TerritorioCatalog) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO territorio_catalog (codigo, nombre, tipo, departamento_codigo) VALUES (?1,?2,?3,?4) \
                 ON CONFLICT(codigo) DO UPDATE SET nombre = excluded.nombre, tipo = excluded.tipo, \
                 departamento_codigo = excluded.departamento_codigo",
                libsql::params![
                    entry.codigo.as_str(),
                    entry.nombre.as_str(),
                    entry.tipo.to_string(),
                    entry.departamento_codigo.clone(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Ensure the always-present state-level entry exists.
    pub async fn ensure_estatal_territorio(&self) -> Result<(), DatabaseError> {
        self.upsert_territorio(&TerritorioCatalog {
            codigo: "ES:STATE".to_string(),
            nombre: "Estado".to_string(),
            tipo: TerritorioTipo::Estatal,
            departamento_codigo: None,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_estatal_is_idempotent() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.ensure_estatal_territorio().await.unwrap();
        db.ensure_estatal_territorio().await.unwrap();
        let entries = db.list_territorios().await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn upsert_refreshes_existing_entry() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.upsert_territorio(&TerritorioCatalog {
            codigo: "CCAA:09".into(),
            nombre: "Cantabria".into(),
            tipo: TerritorioTipo::Autonomico,
            departamento_codigo: Some("09".into()),
        })
        .await
        .unwrap();
        db.upsert_territorio(&TerritorioCatalog {
            codigo: "CCAA:09".into(),
            nombre: "Comunidad Autonoma de Cantabria".into(),
            tipo: TerritorioTipo::Autonomico,
            departamento_codigo: Some("09".into()),
        })
        .await
        .unwrap();
        let entry = db.find_territorio("CCAA:09").await.unwrap().unwrap();
        assert_eq!(entry.nombre, "Comunidad Autonoma de Cantabria");
    }

    #[tokio::test]
    async fn list_by_tipo_filters_to_autonomico() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        db.ensure_estatal_territorio().await.unwrap();
        db.upsert_territorio(&TerritorioCatalog {
            codigo: "CCAA:09".into(),
            nombre: "Cantabria".into(),
            tipo: TerritorioTipo::Autonomico,
            departamento_codigo: Some("09".into()),
        })
        .await
        .unwrap();

        let autonomicos = db.list_by_tipo(TerritorioTipo::Autonomico).await.unwrap();
        assert_eq!(autonomicos.len(), 1);
        assert_eq!(autonomicos[0].codigo, "CCAA:09");
    }
}
