//! Flow construction and backpressure.

use norma_core::enums::{StageName, Trigger};
use tokio::time::{sleep, Duration};

use crate::config::OrchestratorConfig;
use crate::queue::{JobOptions, JobQueue, StageJob};

/// The four named queues a norm flow is built from. `q-build` carries both
/// `build_units` and `build_chunks` jobs.
pub struct Queues {
    pub sync: JobQueue,
    pub build: JobQueue,
    pub index: JobQueue,
    pub orchestrator: JobQueue,
}

impl Queues {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sync: JobQueue::new("q-sync", JobOptions::STAGE),
            build: JobQueue::new("q-build", JobOptions::STAGE),
            index: JobQueue::new("q-index", JobOptions::STAGE),
            orchestrator: JobQueue::new("q-orchestrator", JobOptions::ORCHESTRATOR),
        }
    }

    pub fn queue_for(&self, stage: StageName) -> &JobQueue {
        match stage {
            StageName::Sync => &self.sync,
            StageName::BuildUnits | StageName::BuildChunks => &self.build,
            StageName::Index => &self.index,
        }
    }

    /// Pop the next job from the given stage's queue, if any.
    pub async fn pop(&self, stage: StageName) -> Option<StageJob> {
        self.queue_for(stage).pop().await
    }

    pub async fn ack_success(&self, job: &StageJob) {
        self.queue_for(job.stage).ack_success(job).await;
    }

    pub async fn ack_failure(&self, job: StageJob) -> Option<Duration> {
        let stage = job.stage;
        self.queue_for(stage).ack_failure(job).await
    }
}

impl Default for Queues {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of [`enqueue_norma_flow`] for one stage in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEnqueueOutcome {
    pub stage: StageName,
    pub enqueued: bool,
    pub reason: Option<&'static str>,
}

/// Build and enqueue the subset of the `sync → build_units → build_chunks →
/// index` chain from `start_from_stage` upward. Each stage is its own
/// independent queue entry; a duplicate is reported rather than raised.
pub async fn enqueue_norma_flow(
    queues: &Queues,
    id_norma: &str,
    trigger: Trigger,
    start_from_stage: StageName,
) -> Vec<StageEnqueueOutcome> {
    let mut outcomes = Vec::new();
    for &stage in start_from_stage.chain_from() {
        let enqueued = queues.queue_for(stage).enqueue(stage, id_norma, trigger).await;
        outcomes.push(StageEnqueueOutcome {
            stage,
            enqueued,
            reason: if enqueued { None } else { Some("duplicate") },
        });
    }
    outcomes
}

/// Block until every named stage's queue depth is at or below its
/// `4 × concurrency` ceiling, polling at `config.backpressure_poll_ms`
/// granularity.
pub async fn wait_for_queue_capacity(queues: &Queues, stages: &[StageName], config: &OrchestratorConfig) {
    loop {
        let mut over_capacity = false;
        for &stage in stages {
            let (queue, concurrency) = match stage {
                StageName::Sync => (&queues.sync, config.sync_concurrency),
                StageName::BuildUnits | StageName::BuildChunks => (&queues.build, config.build_concurrency),
                StageName::Index => (&queues.index, config.index_concurrency),
            };
            let ceiling = OrchestratorConfig::depth_ceiling(concurrency) as usize;
            if queue.depth().await > ceiling {
                over_capacity = true;
                break;
            }
        }
        if !over_capacity {
            return;
        }
        sleep(Duration::from_millis(config.backpressure_poll_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flow_from_sync_enqueues_all_four_stages() {
        let queues = Queues::new();
        let outcomes = enqueue_norma_flow(&queues, "BOE-A-1", Trigger::Backfill, StageName::Sync).await;
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| o.enqueued));
    }

    #[tokio::test]
    async fn flow_from_build_units_skips_sync() {
        let queues = Queues::new();
        let outcomes = enqueue_norma_flow(&queues, "BOE-A-1", Trigger::Resume, StageName::BuildUnits).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].stage, StageName::BuildUnits);
    }

    #[tokio::test]
    async fn duplicate_flow_is_reported_not_raised() {
        let queues = Queues::new();
        enqueue_norma_flow(&queues, "BOE-A-1", Trigger::Backfill, StageName::Sync).await;
        let second = enqueue_norma_flow(&queues, "BOE-A-1", Trigger::Backfill, StageName::Sync).await;
        assert!(second.iter().all(|o| !o.enqueued && o.reason == Some("duplicate")));
    }

    #[tokio::test]
    async fn wait_for_capacity_returns_immediately_when_under_ceiling() {
        let queues = Queues::new();
        let config = OrchestratorConfig::default();
        wait_for_queue_capacity(&queues, &[StageName::Sync], &config).await;
    }
}
