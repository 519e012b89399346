//! Seeding entry points: `backfill` discovers norms and
//! enqueues every one from `sync`; `resume` re-drives norms whose rollup
//! isn't `ok` from wherever they left off.

use chrono::Utc;
use norma_core::enums::{RollupStatus, StageName, Trigger};
use norma_db::NormaDb;
use norma_source::SourceClient;

use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::flow::{enqueue_norma_flow, wait_for_queue_capacity, Queues};

const DISCOVER_PAGE_SIZE: u64 = 100;

/// Outcome counters for one seed pass, handed back to the CLI for its
/// summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub discovered: usize,
    pub enqueued: usize,
    pub skipped_duplicate: usize,
}

/// Page through the source's discover endpoint, normalizing and upserting
/// every item, then enqueue a full `sync → index` flow for each. Also ensures the territorio catalog when
/// `config.normalize_territory` is set.
///
/// # Errors
///
/// Returns [`OrchestratorError`] if discovery, normalization, or a database
/// write fails.
pub async fn backfill(
    db: &NormaDb,
    source: &SourceClient,
    queues: &Queues,
    config: &OrchestratorConfig,
    from: Option<&str>,
    to: Option<&str>,
    query: Option<&str>,
) -> Result<SeedStats, OrchestratorError> {
    let mut stats = SeedStats::default();
    let mut offset = 0u64;

    loop {
        let now = Utc::now();
        let page = source.discover(from, to, offset, DISCOVER_PAGE_SIZE, query).await?;
        if page.items.is_empty() {
            break;
        }

        for raw in &page.items {
            let normalized = norma_parser::discover::normalize(raw, now)?;
            let id_norma = normalized.id_norma.clone();

            if config.normalize_territory {
                ensure_territorio_for(db, &normalized).await?;
            }

            db.upsert_from_discover(normalized, now, false).await?;
            db.ensure_norma_pending(&id_norma, now, false).await?;
            stats.discovered += 1;

            wait_for_queue_capacity(queues, &StageName::ALL, config).await;
            let outcomes = enqueue_norma_flow(queues, &id_norma, Trigger::Backfill, StageName::Sync).await;
            if outcomes.iter().all(|o| o.enqueued) {
                stats.enqueued += 1;
            } else {
                stats.skipped_duplicate += 1;
            }
        }

        offset += page.items.len() as u64;
    }

    Ok(stats)
}

async fn ensure_territorio_for(db: &NormaDb, norma: &norma_core::entities::Norma) -> Result<(), OrchestratorError> {
    let resolved = norma_parser::territorio::resolve(
        norma.ambito_codigo.as_deref(),
        norma.ambito_texto.as_deref(),
        norma.departamento_codigo.as_deref(),
        norma.departamento_texto.as_deref(),
    );
    for entry in norma_semantic::territorio_catalog::entries_to_ensure(&resolved) {
        db.upsert_territorio(&entry).await?;
    }
    db.ensure_estatal_territorio().await?;
    Ok(())
}

/// Re-drive norms whose rollup isn't `ok`, oldest-`last_seen_at` first, each
/// resumed from its `earliest_incomplete_stage`. `limit`
/// caps how many norms are picked up in one pass.
///
/// # Errors
///
/// Returns [`OrchestratorError`] if a database read or write fails.
pub async fn resume(
    db: &NormaDb,
    queues: &Queues,
    config: &OrchestratorConfig,
    limit: Option<usize>,
) -> Result<SeedStats, OrchestratorError> {
    let mut candidates = Vec::new();
    for rollup in [RollupStatus::Pending, RollupStatus::Running, RollupStatus::Failed] {
        candidates.extend(db.list_sync_states_by_rollup(rollup).await?);
    }
    candidates.sort_by(|a, b| (a.last_seen_at, &a.id_norma).cmp(&(b.last_seen_at, &b.id_norma)));
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }

    let mut stats = SeedStats::default();
    for state in candidates {
        let Some(stage) = state.earliest_incomplete_stage() else {
            continue;
        };
        let now = Utc::now();
        db.ensure_norma_pending(&state.id_norma, now, true).await?;

        wait_for_queue_capacity(queues, &StageName::ALL, config).await;
        let outcomes = enqueue_norma_flow(queues, &state.id_norma, Trigger::Resume, stage).await;
        stats.discovered += 1;
        if outcomes.iter().all(|o| o.enqueued) {
            stats.enqueued += 1;
        } else {
            stats.skipped_duplicate += 1;
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resume_skips_norms_with_no_incomplete_stage() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let queues = Queues::new();
        let config = OrchestratorConfig::default();
        let now = Utc::now();
        db.ensure_norma_pending("BOE-A-1", now, false).await.unwrap();
        for stage in StageName::ALL {
            db.mark_stage_start("BOE-A-1", stage, now).await.unwrap();
            db.mark_stage_success("BOE-A-1", stage, now).await.unwrap();
        }

        let stats = resume(&db, &queues, &config, None).await.unwrap();
        assert_eq!(stats.discovered, 0);
        assert_eq!(stats.enqueued, 0);
    }

    #[tokio::test]
    async fn resume_enqueues_from_earliest_incomplete_stage() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let queues = Queues::new();
        let config = OrchestratorConfig::default();
        let now = Utc::now();
        db.ensure_norma_pending("BOE-A-2", now, false).await.unwrap();
        db.mark_stage_start("BOE-A-2", StageName::Sync, now).await.unwrap();
        db.mark_stage_success("BOE-A-2", StageName::Sync, now).await.unwrap();

        let stats = resume(&db, &queues, &config, None).await.unwrap();
        assert_eq!(stats.enqueued, 1);
        assert_eq!(queues.build.depth().await, 1);
    }

    #[tokio::test]
    async fn resume_respects_limit() {
        let db = NormaDb::open_local(":memory:").await.unwrap();
        let queues = Queues::new();
        let config = OrchestratorConfig::default();
        let now = Utc::now();
        db.ensure_norma_pending("BOE-A-3", now, false).await.unwrap();
        db.ensure_norma_pending("BOE-A-4", now, false).await.unwrap();

        let stats = resume(&db, &queues, &config, Some(1)).await.unwrap();
        assert_eq!(stats.discovered, 1);
    }
}
