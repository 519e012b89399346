//! # norma-db
//!
//! libSQL-backed repositories for the pipeline's persisted entities: norma,
//! indice, bloque, version, unidad, chunk_semantico, territorio_catalog, and
//! sync_state. Every repository method is an id-keyed upsert or a bulk
//! update — the document store is the single source of truth for progress
//! and entities.
//!
//! Uses the `libsql` crate (C SQLite fork) — provides a stable embedded/
//! remote-replica API without depending on a separately-run server process.

pub mod error;
pub mod helpers;
pub mod migrations;
pub mod repos;
pub mod retry;

use libsql::Builder;

use error::DatabaseError;

/// Thin wrapper over a libSQL connection, opened local-only or as a synced
/// embedded replica of a remote database.
pub struct NormaDb {
    #[allow(dead_code)]
    database: libsql::Database,
    conn: libsql::Connection,
    synced_replica: bool,
}

impl NormaDb {
    /// Open (or create) a local-only database file. Pass `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open_local(db_path: &str) -> Result<Self, DatabaseError> {
        let database = Builder::new_local(db_path)
            .build()
            .await
            .map_err(DatabaseError::LibSql)?;
        let conn = database.connect().map_err(DatabaseError::LibSql)?;
        let db = Self {
            database,
            conn,
            synced_replica: false,
        };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open a synced embedded replica of a remote database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the replica cannot be opened, synced, or migrated.
    pub async fn open_synced(
        local_replica_path: &str,
        remote_url: &str,
        auth_token: &str,
    ) -> Result<Self, DatabaseError> {
        let database = Builder::new_remote_replica(local_replica_path, remote_url.to_string(), auth_token.to_string())
            .build()
            .await
            .map_err(DatabaseError::LibSql)?;
        database.sync().await.map_err(DatabaseError::LibSql)?;
        let conn = database.connect().map_err(DatabaseError::LibSql)?;
        let db = Self {
            database,
            conn,
            synced_replica: true,
        };
        db.run_migrations().await?;
        Ok(db)
    }

    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_synced_replica(&self) -> bool {
        self.synced_replica
    }

    /// Pull remote changes into the local embedded replica. A no-op for
    /// local-only databases.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the sync round-trip fails.
    pub async fn sync(&self) -> Result<(), DatabaseError> {
        if self.synced_replica {
            self.database.sync().await.map_err(DatabaseError::LibSql)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_local_runs_migrations() {
        let db = NormaDb::open_local(":memory:").await.expect("open");
        let mut rows = db
            .conn()
            .query("SELECT name FROM sqlite_master WHERE type='table' AND name='normas'", ())
            .await
            .expect("query");
        assert!(rows.next().await.expect("row").is_some());
    }
}
