//! In-process stand-in for the job broker: a FIFO queue with
//! deterministic job ids for at-most-one-in-flight dedup, plus a bounded
//! attempt/backoff contract the stage worker consults on failure.
//!
//! A real deployment points this at an external broker; the shape here
//! (dedup by job id, `waiting+active` depth, retry-with-backoff on failure)
//! is what `norma-cli`'s single-process `pipeline` binary runs against.

use std::collections::{HashSet, VecDeque};

use norma_core::enums::{StageName, Trigger};
use tokio::sync::Mutex;
use tokio::time::Duration;

/// One unit of work for a stage worker.
#[derive(Debug, Clone)]
pub struct StageJob {
    pub job_id: String,
    pub stage: StageName,
    pub id_norma: String,
    pub trigger: Trigger,
    pub attempts: u32,
}

impl StageJob {
    #[must_use]
    pub fn job_id_for(stage: StageName, id_norma: &str) -> String {
        format!("{}__{id_norma}", stage.as_str())
    }
}

/// `attempts`/backoff/removal policy for a queue.
#[derive(Debug, Clone, Copy)]
pub struct JobOptions {
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
}

impl JobOptions {
    /// `attempts=5`, exponential backoff `delay=1000ms` — `q-sync`,
    /// `q-build`, `q-index`.
    pub const STAGE: Self = Self { max_attempts: 5, backoff_base_ms: 1_000 };

    /// `attempts=3` — `q-orchestrator`.
    pub const ORCHESTRATOR: Self = Self { max_attempts: 3, backoff_base_ms: 1_000 };

    #[must_use]
    pub fn backoff_delay(&self, attempts: u32) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << attempts.min(10)))
    }
}

#[derive(Default)]
struct QueueState {
    waiting: VecDeque<StageJob>,
    in_flight: HashSet<String>,
}

/// A single named queue (`q-sync`, `q-build`, `q-index`, or
/// `q-orchestrator`).
pub struct JobQueue {
    pub name: &'static str,
    options: JobOptions,
    state: Mutex<QueueState>,
}

impl JobQueue {
    #[must_use]
    pub fn new(name: &'static str, options: JobOptions) -> Self {
        Self { name, options, state: Mutex::new(QueueState::default()) }
    }

    /// `waiting + active` count — the depth `wait_for_queue_capacity` polls.
    pub async fn depth(&self) -> usize {
        let state = self.state.lock().await;
        state.waiting.len() + state.in_flight.len()
    }

    /// Enqueue a deterministic-id job. Returns `false` without enqueuing if
    /// a job with the same id is already waiting or in flight.
    pub async fn enqueue(&self, stage: StageName, id_norma: impl Into<String>, trigger: Trigger) -> bool {
        let id_norma = id_norma.into();
        let job_id = StageJob::job_id_for(stage, &id_norma);
        let mut state = self.state.lock().await;
        if state.in_flight.contains(&job_id) {
            return false;
        }
        state.in_flight.insert(job_id.clone());
        state.waiting.push_back(StageJob { job_id, stage, id_norma, trigger, attempts: 0 });
        true
    }

    pub async fn pop(&self) -> Option<StageJob> {
        let mut state = self.state.lock().await;
        state.waiting.pop_front()
    }

    /// Mark a job done; clears its in-flight dedup entry so the same
    /// `(stage, id_norma)` can be enqueued again later.
    pub async fn ack_success(&self, job: &StageJob) {
        let mut state = self.state.lock().await;
        state.in_flight.remove(&job.job_id);
    }

    /// Re-enqueue with an incremented attempt count if attempts remain
    /// under `max_attempts`; otherwise drop it for good. Returns the
    /// backoff delay the caller should wait before the job is visible
    /// again, or `None` if the job was dropped.
    pub async fn ack_failure(&self, mut job: StageJob) -> Option<Duration> {
        job.attempts += 1;
        if job.attempts >= self.options.max_attempts {
            let mut state = self.state.lock().await;
            state.in_flight.remove(&job.job_id);
            return None;
        }
        let delay = self.options.backoff_delay(job.attempts);
        let mut state = self.state.lock().await;
        state.waiting.push_back(job);
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_job_id_is_rejected() {
        let queue = JobQueue::new("q-sync", JobOptions::STAGE);
        assert!(queue.enqueue(StageName::Sync, "BOE-A-1", Trigger::Backfill).await);
        assert!(!queue.enqueue(StageName::Sync, "BOE-A-1", Trigger::Backfill).await);
        assert_eq!(queue.depth().await, 1);
    }

    #[tokio::test]
    async fn success_clears_in_flight_dedup() {
        let queue = JobQueue::new("q-sync", JobOptions::STAGE);
        queue.enqueue(StageName::Sync, "BOE-A-1", Trigger::Backfill).await;
        let job = queue.pop().await.unwrap();
        queue.ack_success(&job).await;
        assert_eq!(queue.depth().await, 0);
        assert!(queue.enqueue(StageName::Sync, "BOE-A-1", Trigger::Backfill).await);
    }

    #[tokio::test]
    async fn failure_requeues_until_attempts_exhausted() {
        let queue = JobQueue::new("q-index", JobOptions { max_attempts: 2, backoff_base_ms: 1 });
        queue.enqueue(StageName::Index, "BOE-A-1", Trigger::Resume).await;
        let job = queue.pop().await.unwrap();
        assert!(queue.ack_failure(job).await.is_some());
        let retried = queue.pop().await.unwrap();
        assert_eq!(retried.attempts, 1);
        assert!(queue.ack_failure(retried).await.is_none());
        assert_eq!(queue.depth().await, 0);
    }
}
