//! SyncState repository — persists [`norma_core::entities::SyncState`], the
//! per-norm progress tracker driving the orchestrator's resume/backfill logic.

use chrono::{DateTime, Utc};
use norma_core::entities::{StageRow, SyncState};
use norma_core::enums::{RollupStatus, StageName};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_json_column, parse_optional_datetime, to_json_column};
use crate::NormaDb;

const SELECT_COLS: &str = "id_norma, rollup, sync_json, build_units_json, build_chunks_json, index_json, \
last_seen_at, last_started_at, last_finished_at, last_error_message";

fn row_to_sync_state(row: &libsql::Row) -> Result<SyncState, DatabaseError> {
    let rollup_raw: String = row.get(1)?;
    let rollup = match rollup_raw.as_str() {
        "pending" => RollupStatus::Pending,
        "running" => RollupStatus::Running,
        "ok" => RollupStatus::Ok,
        _ => RollupStatus::Failed,
    };
    Ok(SyncState {
        id_norma: row.get(0)?,
        rollup,
        sync: parse_json_column::<StageRow>(&row.get::<String>(2)?)?,
        build_units: parse_json_column::<StageRow>(&row.get::<String>(3)?)?,
        build_chunks: parse_json_column::<StageRow>(&row.get::<String>(4)?)?,
        index: parse_json_column::<StageRow>(&row.get::<String>(5)?)?,
        last_seen_at: parse_datetime(&row.get::<String>(6)?)?,
        last_started_at: parse_optional_datetime(row.get::<Option<String>>(7)?.as_deref())?,
        last_finished_at: parse_optional_datetime(row.get::<Option<String>>(8)?.as_deref())?,
        last_error_message: crate::helpers::get_opt_string(row, 9)?,
    })
}

impl NormaDb {
    pub async fn find_sync_state(&self, id_norma: &str) -> Result<Option<SyncState>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM sync_state WHERE id_norma = ?1"), [id_norma])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_sync_state(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_sync_states_by_rollup(&self, rollup: RollupStatus) -> Result<Vec<SyncState>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM sync_state WHERE rollup = ?1"), [rollup.as_str()])
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_sync_state(&row)?);
        }
        Ok(out)
    }

    /// Every norm's progress row, for the orchestrator's stats aggregation.
    pub async fn list_all_sync_states(&self) -> Result<Vec<SyncState>, DatabaseError> {
        let mut rows = self.conn().query(&format!("SELECT {SELECT_COLS} FROM sync_state"), ()).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_sync_state(&row)?);
        }
        Ok(out)
    }

    async fn save_sync_state(&self, state: &SyncState) -> Result<(), DatabaseError> {
        let sync_json = to_json_column(&state.sync)?;
        let build_units_json = to_json_column(&state.build_units)?;
        let build_chunks_json = to_json_column(&state.build_chunks)?;
        let index_json = to_json_column(&state.index)?;

        self.conn()
            .execute(
                "INSERT INTO sync_state (id_norma, rollup, sync_json, build_units_json, build_chunks_json, \
                 index_json, last_seen_at, last_started_at, last_finished_at, last_error_message) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10) \
                 ON CONFLICT(id_norma) DO UPDATE SET rollup=excluded.rollup, sync_json=excluded.sync_json, \
                 build_units_json=excluded.build_units_json, build_chunks_json=excluded.build_chunks_json, \
                 index_json=excluded.index_json, last_seen_at=excluded.last_seen_at, \
                 last_started_at=excluded.last_started_at, last_finished_at=excluded.last_finished_at, \
                 last_error_message=excluded.last_error_message",
                libsql::params![
                    state.id_norma.as_str(),
                    state.rollup.as_str(),
                    sync_json,
                    build_units_json,
                    build_chunks_json,
                    index_json,
                    state.last_seen_at.to_rfc3339(),
                    state.last_started_at.map(|d| d.to_rfc3339()),
                    state.last_finished_at.map(|d| d.to_rfc3339()),
                    state.last_error_message.clone(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Ensure a pending `SyncState` row exists for `id_norma`. When
    /// `force_reset_stages` is set (a backfill/resume request that wants a
    /// clean slate), an existing row is replaced with a fresh pending one.
    pub async fn ensure_norma_pending(
        &self,
        id_norma: &str,
        now: DateTime<Utc>,
        force_reset_stages: bool,
    ) -> Result<SyncState, DatabaseError> {
        match self.find_sync_state(id_norma).await? {
            Some(existing) if !force_reset_stages => Ok(existing),
            _ => {
                let fresh = SyncState::pending(id_norma, now);
                self.save_sync_state(&fresh).await?;
                Ok(fresh)
            }
        }
    }

    pub async fn mark_stage_start(&self, id_norma: &str, stage: StageName, now: DateTime<Utc>) -> Result<SyncState, DatabaseError> {
        let mut state = self
            .find_sync_state(id_norma)
            .await?
            .unwrap_or_else(|| SyncState::pending(id_norma, now));
        state.mark_stage_start(stage, now);
        self.save_sync_state(&state).await?;
        Ok(state)
    }

    pub async fn mark_stage_success(&self, id_norma: &str, stage: StageName, now: DateTime<Utc>) -> Result<SyncState, DatabaseError> {
        let mut state = self.find_sync_state(id_norma).await?.ok_or(DatabaseError::NoResult)?;
        state.mark_stage_success(stage, now);
        self.save_sync_state(&state).await?;
        Ok(state)
    }

    pub async fn mark_stage_failure(
        &self,
        id_norma: &str,
        stage: StageName,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<SyncState, DatabaseError> {
        let mut state = self.find_sync_state(id_norma).await?.ok_or(DatabaseError::NoResult)?;
        state.mark_stage_failure(stage, error, now);
        self.save_sync_state(&state).await?;
        Ok(state)
    }
}
