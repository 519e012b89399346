use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{RollupStatus, StageName, StageStatus};

/// Per-stage bookkeeping inside a norm's [`SyncState`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageRow {
    pub status: StageStatus,
    pub attempts: u32,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for StageRow {
    fn default() -> Self {
        Self {
            status: StageStatus::Pending,
            attempts: 0,
            last_started_at: None,
            last_finished_at: None,
            last_error: None,
        }
    }
}

/// Per-norm progress through the four-stage pipeline.
///
/// ```text
/// markStageStart(s): stages[s] := running; stages[s'] := pending for s' > s; attempts[s] += 1
/// markStageSuccess(s): stages[s] := ok; rollup := ok iff s == index else downstream reset to pending
/// markStageFailure(s, err): stages[s] := failed; rollup := failed
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncState {
    pub id_norma: String,
    pub rollup: RollupStatus,
    pub sync: StageRow,
    pub build_units: StageRow,
    pub build_chunks: StageRow,
    pub index: StageRow,
    pub last_seen_at: DateTime<Utc>,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_error_message: Option<String>,
}

impl SyncState {
    #[must_use]
    pub fn pending(id_norma: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id_norma: id_norma.into(),
            rollup: RollupStatus::Pending,
            sync: StageRow::default(),
            build_units: StageRow::default(),
            build_chunks: StageRow::default(),
            index: StageRow::default(),
            last_seen_at: now,
            last_started_at: None,
            last_finished_at: None,
            last_error_message: None,
        }
    }

    fn stage_mut(&mut self, stage: StageName) -> &mut StageRow {
        match stage {
            StageName::Sync => &mut self.sync,
            StageName::BuildUnits => &mut self.build_units,
            StageName::BuildChunks => &mut self.build_chunks,
            StageName::Index => &mut self.index,
        }
    }

    #[must_use]
    pub fn stage(&self, stage: StageName) -> &StageRow {
        match stage {
            StageName::Sync => &self.sync,
            StageName::BuildUnits => &self.build_units,
            StageName::BuildChunks => &self.build_chunks,
            StageName::Index => &self.index,
        }
    }

    /// Stages ordered after `stage` in pipeline order.
    fn downstream_of(stage: StageName) -> &'static [StageName] {
        match stage {
            StageName::Sync => &[StageName::BuildUnits, StageName::BuildChunks, StageName::Index],
            StageName::BuildUnits => &[StageName::BuildChunks, StageName::Index],
            StageName::BuildChunks => &[StageName::Index],
            StageName::Index => &[],
        }
    }

    pub fn mark_stage_start(&mut self, stage: StageName, now: DateTime<Utc>) {
        for downstream in Self::downstream_of(stage) {
            self.stage_mut(*downstream).status = StageStatus::Pending;
        }
        let row = self.stage_mut(stage);
        row.status = StageStatus::Running;
        row.attempts += 1;
        row.last_started_at = Some(now);
        self.rollup = RollupStatus::Running;
        self.last_started_at = Some(now);
        self.last_seen_at = now;
    }

    pub fn mark_stage_success(&mut self, stage: StageName, now: DateTime<Utc>) {
        {
            let row = self.stage_mut(stage);
            row.status = StageStatus::Ok;
            row.last_finished_at = Some(now);
            row.last_error = None;
        }
        if stage == StageName::Index {
            self.rollup = RollupStatus::Ok;
            self.last_finished_at = Some(now);
        } else {
            for downstream in Self::downstream_of(stage) {
                self.stage_mut(*downstream).status = StageStatus::Pending;
            }
            self.rollup = RollupStatus::Pending;
        }
        self.last_seen_at = now;
    }

    pub fn mark_stage_failure(&mut self, stage: StageName, error: impl Into<String>, now: DateTime<Utc>) {
        let message = error.into();
        {
            let row = self.stage_mut(stage);
            row.status = StageStatus::Failed;
            row.last_finished_at = Some(now);
            row.last_error = Some(message.clone());
        }
        self.rollup = RollupStatus::Failed;
        self.last_error_message = Some(message);
        self.last_seen_at = now;
    }

    /// The earliest stage whose status is not `ok` — where `resume` restarts.
    #[must_use]
    pub fn earliest_incomplete_stage(&self) -> Option<StageName> {
        StageName::ALL.into_iter().find(|s| self.stage(*s).status != StageStatus::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_sync_leaves_downstream_pending() {
        let now = Utc::now();
        let mut state = SyncState::pending("BOE-A-1", now);
        state.mark_stage_start(StageName::Sync, now);
        assert_eq!(state.sync.status, StageStatus::Running);
        assert_eq!(state.sync.attempts, 1);
        assert_eq!(state.build_units.status, StageStatus::Pending);
        assert_eq!(state.rollup, RollupStatus::Running);
    }

    #[test]
    fn success_on_non_index_stage_resets_downstream_to_pending() {
        let now = Utc::now();
        let mut state = SyncState::pending("BOE-A-1", now);
        state.mark_stage_start(StageName::Sync, now);
        state.mark_stage_success(StageName::Sync, now);
        assert_eq!(state.sync.status, StageStatus::Ok);
        assert_eq!(state.build_units.status, StageStatus::Pending);
        assert_eq!(state.rollup, RollupStatus::Pending);
    }

    #[test]
    fn success_on_index_stage_sets_rollup_ok() {
        let now = Utc::now();
        let mut state = SyncState::pending("BOE-A-1", now);
        for stage in StageName::ALL {
            state.mark_stage_start(stage, now);
            state.mark_stage_success(stage, now);
        }
        assert_eq!(state.rollup, RollupStatus::Ok);
        assert!(StageName::ALL.iter().all(|s| state.stage(*s).status == StageStatus::Ok));
    }

    #[test]
    fn failure_sets_rollup_failed_and_records_message() {
        let now = Utc::now();
        let mut state = SyncState::pending("BOE-A-1", now);
        state.mark_stage_start(StageName::BuildUnits, now);
        state.mark_stage_failure(StageName::BuildUnits, "boom", now);
        assert_eq!(state.rollup, RollupStatus::Failed);
        assert_eq!(state.build_units.status, StageStatus::Failed);
        assert_eq!(state.last_error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn earliest_incomplete_stage_finds_first_non_ok() {
        let now = Utc::now();
        let mut state = SyncState::pending("BOE-A-1", now);
        state.mark_stage_start(StageName::Sync, now);
        state.mark_stage_success(StageName::Sync, now);
        assert_eq!(state.earliest_incomplete_stage(), Some(StageName::BuildUnits));
    }
}
