//! # norma-orchestrator
//!
//! The four-stage pipeline's runtime: an in-process job queue standing in
//! for a broker, flow construction from `sync` through `index`, the
//! backfill/resume seeds that populate it, and the stage workers that
//! execute a job against the database, object store, embedder, and vector
//! store.
//!
//! `norma-cli`'s `pipeline` binary wires [`config::OrchestratorConfig`],
//! [`flow::Queues`], and [`workers::StageContext`] together and drains the
//! queues in a loop; `ingestor`/`builder`/`indexer` run a single stage's
//! worker directly against norms named on the command line.

pub mod config;
pub mod error;
pub mod flow;
pub mod queue;
pub mod seed;
pub mod workers;

pub use config::OrchestratorConfig;
pub use error::OrchestratorError;
pub use flow::{enqueue_norma_flow, wait_for_queue_capacity, Queues, StageEnqueueOutcome};
pub use queue::{JobOptions, JobQueue, StageJob};
pub use seed::{backfill, resume, SeedStats};
pub use workers::{run_stage_job, StageContext};
