//! Status, type, and mode enums for the pipeline.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! [`StageStatus`] provides `allowed_next_states()` to enforce valid transitions
//! at the application layer, the same shape the rest of the pack uses for its
//! lifecycle enums.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// UnidadTipo
// ---------------------------------------------------------------------------

/// Semantic type of a retrieval unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnidadTipo {
    Articulo,
    DisposicionAdicional,
    DisposicionTransitoria,
    DisposicionFinal,
    Anexo,
    Preambulo,
    Otros,
}

impl UnidadTipo {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Articulo => "ARTICULO",
            Self::DisposicionAdicional => "DISPOSICION_ADICIONAL",
            Self::DisposicionTransitoria => "DISPOSICION_TRANSITORIA",
            Self::DisposicionFinal => "DISPOSICION_FINAL",
            Self::Anexo => "ANEXO",
            Self::Preambulo => "PREAMBULO",
            Self::Otros => "OTROS",
        }
    }

    /// `true` for the three disposition sub-types.
    #[must_use]
    pub const fn is_disposicion(self) -> bool {
        matches!(
            self,
            Self::DisposicionAdicional | Self::DisposicionTransitoria | Self::DisposicionFinal
        )
    }
}

impl fmt::Display for UnidadTipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BlockKind / level — intermediate classification of an index block
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    UnitRoot,
    Header,
    Noise,
    Other,
}

// ---------------------------------------------------------------------------
// TerritorioTipo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TerritorioTipo {
    Estatal,
    Autonomico,
}

impl fmt::Display for TerritorioTipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Estatal => "ESTATAL",
            Self::Autonomico => "AUTONOMICO",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ChunkMethod
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMethod {
    Simple,
    Recursive,
}

impl ChunkMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Recursive => "recursive",
        }
    }
}

impl fmt::Display for ChunkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RagMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RagMode {
    #[default]
    Normativo,
    Vigencia,
    Mixto,
}

// ---------------------------------------------------------------------------
// StageName — the four orchestrator stages, in pipeline order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Sync,
    BuildUnits,
    BuildChunks,
    Index,
}

impl StageName {
    pub const ALL: [Self; 4] = [Self::Sync, Self::BuildUnits, Self::BuildChunks, Self::Index];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::BuildUnits => "build_units",
            Self::BuildChunks => "build_chunks",
            Self::Index => "index",
        }
    }

    /// Stages from `self` to `index` inclusive, in execution order — the
    /// chain `enqueueNormaFlow` builds for a given `startFromStage`.
    #[must_use]
    pub fn chain_from(self) -> &'static [Self] {
        match self {
            Self::Sync => &Self::ALL,
            Self::BuildUnits => &Self::ALL[1..],
            Self::BuildChunks => &Self::ALL[2..],
            Self::Index => &Self::ALL[3..],
        }
    }

    /// The stage that immediately precedes `self`, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Sync => None,
            Self::BuildUnits => Some(Self::Sync),
            Self::BuildChunks => Some(Self::BuildUnits),
            Self::Index => Some(Self::BuildChunks),
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StageStatus
// ---------------------------------------------------------------------------

/// Status of a single stage within a norm's sync state.
///
/// ```text
/// pending → running → ok
///                   → failed
/// ```
///
/// Legacy `error` values are coerced to `failed` on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Ok,
    Failed,
}

impl StageStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Running],
            Self::Running => &[Self::Ok, Self::Failed],
            Self::Ok | Self::Failed => &[Self::Pending, Self::Running],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Ok => "ok",
            Self::Failed => "failed",
        }
    }

    /// Coerce a raw string read from storage, mapping legacy values
    /// (`"error"`) onto the current enum.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "ok" => Self::Ok,
            "failed" | "error" => Self::Failed,
            _ => Self::Failed,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RollupStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupStatus {
    Pending,
    Running,
    Ok,
    Failed,
}

impl RollupStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Ok => "ok",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RollupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Trigger — why a stage job was enqueued
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Backfill,
    Resume,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Backfill => "backfill",
            Self::Resume => "resume",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_status_transitions() {
        assert!(StageStatus::Pending.can_transition_to(StageStatus::Running));
        assert!(!StageStatus::Pending.can_transition_to(StageStatus::Ok));
        assert!(StageStatus::Running.can_transition_to(StageStatus::Ok));
        assert!(StageStatus::Running.can_transition_to(StageStatus::Failed));
    }

    #[test]
    fn legacy_error_coerces_to_failed() {
        assert_eq!(StageStatus::coerce("error"), StageStatus::Failed);
        assert_eq!(StageStatus::coerce("ok"), StageStatus::Ok);
    }

    #[test]
    fn stage_chain_from_build_units_skips_sync() {
        let chain = StageName::BuildUnits.chain_from();
        assert_eq!(
            chain,
            &[StageName::BuildUnits, StageName::BuildChunks, StageName::Index]
        );
    }
}
