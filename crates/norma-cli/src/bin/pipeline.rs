//! `norma-pipeline`: drives the full `sync -> build_units -> build_chunks ->
//! index` flow through [`norma_orchestrator`]'s queues, seeded by
//! `backfill`/`resume`.
//!
//! This process owns the queues for its whole lifetime — there's no broker
//! or second process to address, so `stop` has no remote target; it exists
//! so operators used to daemon-style tooling get a clear answer rather than
//! an unknown subcommand. A running `backfill`/`resume` drains in flight and
//! exits cleanly on SIGINT.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use norma_cli::GlobalFlags;
use norma_config::NormaConfig;
use norma_core::enums::StageName;
use norma_orchestrator::workers::run_stage_job;
use norma_orchestrator::{backfill, resume, Queues, StageContext};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "norma-pipeline", about = "Drive the queued sync/build/index flow")]
struct Cli {
    #[command(flatten)]
    global: GlobalFlags,

    /// Also host the `/rag/*` and `/pipeline/stats` HTTP surface in this
    /// process, sharing the live queue depths.
    #[arg(long, global = true)]
    inline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover norms from the source API and enqueue a full flow for each.
    Backfill {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        query: Option<String>,
    },
    /// Re-drive norms whose rollup isn't `ok` from their earliest incomplete stage.
    Resume {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print guidance for stopping an in-flight `backfill`/`resume` run.
    Stop,
    /// Print current rollup and queue-depth counters as JSON.
    Stats,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("norma-pipeline error: {error:#}");
        std::process::exit(norma_cli::exit_code_for(&error));
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    norma_cli::init_tracing(cli.global.quiet, cli.global.verbose)?;
    let config = NormaConfig::load()?;

    match cli.command {
        Command::Stop => {
            println!(
                "norma-pipeline runs in the foreground with no separate daemon to signal. \
                 Press Ctrl+C on the running `backfill`/`resume` invocation; in-flight jobs finish before it exits."
            );
            Ok(())
        }
        Command::Stats => stats(&config).await,
        Command::Backfill { from, to, query } => {
            drive(&config, cli.inline, cli.global.dry_run, move |ctx, queues, seed_config| {
                Box::pin(async move {
                    backfill(&ctx.db, &ctx.source, &queues, &seed_config, from.as_deref(), to.as_deref(), query.as_deref()).await
                })
            })
            .await
        }
        Command::Resume { limit } => {
            drive(&config, cli.inline, cli.global.dry_run, move |ctx, queues, seed_config| {
                Box::pin(async move { resume(&ctx.db, &queues, &seed_config, limit).await })
            })
            .await
        }
    }
}

type SeedFuture = std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<norma_orchestrator::SeedStats, norma_orchestrator::OrchestratorError>> + Send>,
>;

/// Start the stage workers, run `seed` to populate the queues, drain them,
/// then stop the workers. `seed` is handed owned `Arc` clones of the
/// [`StageContext`] and [`Queues`] this run built, plus the resolved
/// [`norma_orchestrator::OrchestratorConfig`], and returns once everything
/// it wants to enqueue has been enqueued — draining happens here, not
/// inside `seed`.
async fn drive(
    config: &NormaConfig,
    inline_api: bool,
    dry_run: bool,
    seed: impl FnOnce(Arc<StageContext>, Arc<Queues>, norma_orchestrator::OrchestratorConfig) -> SeedFuture,
) -> anyhow::Result<()> {
    if dry_run {
        info!("dry run: would seed and drain the pipeline queues");
        return Ok(());
    }

    let ctx = Arc::new(norma_cli::wiring::stage_context(config).await?);
    let queues = Arc::new(Queues::new());
    let stop = Arc::new(AtomicBool::new(false));

    let mut workers = Vec::new();
    workers.extend(spawn_workers(&ctx, &queues, &stop, StageName::Sync, ctx.config.sync_concurrency));
    workers.extend(spawn_workers(&ctx, &queues, &stop, StageName::BuildUnits, ctx.config.build_concurrency));
    workers.extend(spawn_workers(&ctx, &queues, &stop, StageName::Index, ctx.config.index_concurrency));

    let api_handle = if inline_api {
        Some(spawn_inline_api(config, Arc::clone(&queues)).await?)
    } else {
        None
    };

    let orchestrator_config = ctx.config.clone();
    let stats = seed(Arc::clone(&ctx), Arc::clone(&queues), orchestrator_config).await?;
    info!(discovered = stats.discovered, enqueued = stats.enqueued, skipped_duplicate = stats.skipped_duplicate, "seed complete");

    wait_for_drain(&queues).await;
    stop.store(true, Ordering::Relaxed);
    for worker in workers {
        let _ = worker.await;
    }

    if let Some(handle) = api_handle {
        handle.abort();
    }

    Ok(())
}

fn spawn_workers(
    ctx: &Arc<StageContext>,
    queues: &Arc<Queues>,
    stop: &Arc<AtomicBool>,
    stage: StageName,
    concurrency: u32,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..concurrency.max(1))
        .map(|_| {
            let ctx = Arc::clone(ctx);
            let queues = Arc::clone(queues);
            let stop = Arc::clone(stop);
            tokio::spawn(async move { worker_loop(&ctx, &queues, stage, &stop).await })
        })
        .collect()
}

/// `stage` only selects which underlying queue (`sync`, `build`, or
/// `index`) this worker polls — `q-build` carries both `build_units` and
/// `build_chunks` jobs, and each popped job's own `.stage` tells
/// `run_stage_job` which one it is.
async fn worker_loop(ctx: &StageContext, queues: &Queues, stage: StageName, stop: &AtomicBool) {
    loop {
        match queues.pop(stage).await {
            Some(job) => run_stage_job(ctx, queues, job).await,
            None => {
                if stop.load(Ordering::Relaxed) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }
    }
}

async fn wait_for_drain(queues: &Queues) {
    loop {
        let depth = queues.sync.depth().await + queues.build.depth().await + queues.index.depth().await;
        if depth == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}

async fn spawn_inline_api(config: &NormaConfig, queues: Arc<Queues>) -> anyhow::Result<tokio::task::JoinHandle<()>> {
    let db = norma_cli::wiring::open_db(config).await?;
    let vector = norma_cli::wiring::vector_client(config);
    let embedder = norma_cli::wiring::embedder(config);
    let store = norma_cli::wiring::object_store(config);
    let api_config = norma_cli::wiring::api_config(config);

    let state = norma_api::AppState::new(db, vector, embedder, store, api_config).with_queues(queues);
    Ok(tokio::spawn(async move {
        if let Err(error) = norma_api::serve(state).await {
            tracing::error!(%error, "inline API server exited");
        }
    }))
}

async fn stats(config: &NormaConfig) -> anyhow::Result<()> {
    let db = norma_cli::wiring::open_db(config).await?;
    let states = db.list_all_sync_states().await?;

    let mut by_rollup: std::collections::HashMap<&'static str, usize> = std::collections::HashMap::new();
    for state in &states {
        *by_rollup.entry(state.rollup.as_str()).or_insert(0) += 1;
    }

    println!(
        "{}",
        serde_json::json!({
            "totalNorms": states.len(),
            "byRollup": by_rollup,
            "note": "queue depths are only observable from a running backfill/resume process; this is a point-in-time database snapshot",
        })
    );
    Ok(())
}
