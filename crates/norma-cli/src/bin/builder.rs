//! `norma-builder`: rebuild `Unidad`/`ChunkSemantico` rows for known norms
//! directly (no queue — see `norma-pipeline` for the queued version).

use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use norma_cli::GlobalFlags;
use norma_config::NormaConfig;
use norma_orchestrator::workers::{run_build_chunks_stage, run_build_units_stage};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "norma-builder", about = "Rebuild semantic units and chunks for known norms")]
struct Cli {
    #[command(flatten)]
    global: GlobalFlags,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild `Unidad` rows from whatever `sync` last persisted.
    BuildUnidades {
        #[arg(long)]
        only_norma: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        #[arg(long)]
        fail_on_errors: bool,
        /// Require an extra confirmation before rebuilding every known norm's units.
        #[arg(long)]
        no_confirm: bool,
    },
    /// Re-chunk every unit of the selected norms.
    BuildChunks {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        only_norma: Option<String>,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        #[arg(long, value_enum, default_value_t = ChunkMethodArg::Recursive)]
        method: ChunkMethodArg,
        #[arg(long, default_value_t = 1_000)]
        chunk_size: usize,
        #[arg(long, default_value_t = 100)]
        overlap: usize,
        #[arg(long)]
        fail_on_errors: bool,
    },
    /// Run `build-unidades` then `build-chunks` for the same norm selection.
    BuildAll {
        #[arg(long)]
        only_norma: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        #[arg(long)]
        fail_on_errors: bool,
    },
    /// Print a norm's current rollup/stage status and unit/chunk counts —
    /// a quick sanity check before wiring it into `/rag/search`.
    RagCheck {
        id_norma: String,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ChunkMethodArg {
    Simple,
    Recursive,
}

impl From<ChunkMethodArg> for norma_core::enums::ChunkMethod {
    fn from(value: ChunkMethodArg) -> Self {
        match value {
            ChunkMethodArg::Simple => Self::Simple,
            ChunkMethodArg::Recursive => Self::Recursive,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("norma-builder error: {error:#}");
        std::process::exit(norma_cli::exit_code_for(&error));
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    norma_cli::init_tracing(cli.global.quiet, cli.global.verbose)?;
    let config = NormaConfig::load()?;

    match cli.command {
        Command::BuildUnidades { only_norma, all, concurrency, fail_on_errors, no_confirm } => {
            if all && !no_confirm {
                anyhow::bail!("rebuilding every norm's units is destructive — pass --no-confirm to proceed");
            }
            let ctx = norma_cli::wiring::stage_context(&config).await?;
            let targets = select_targets(&ctx, only_norma, all).await?;
            run_over(&ctx, targets, concurrency, fail_on_errors, cli.global.dry_run, cli.global.quiet, StageKind::BuildUnidades).await
        }
        Command::BuildChunks { from, to, all, only_norma, concurrency, method, chunk_size, overlap, fail_on_errors } => {
            let mut config = config;
            config.chunk.method = method.into();
            config.chunk.size = chunk_size;
            config.chunk.overlap = overlap;

            let ctx = norma_cli::wiring::stage_context(&config).await?;
            let targets = select_targets_ranged(&ctx, only_norma, all, from, to).await?;
            run_over(&ctx, targets, concurrency, fail_on_errors, cli.global.dry_run, cli.global.quiet, StageKind::BuildChunks).await
        }
        Command::BuildAll { only_norma, all, concurrency, fail_on_errors } => {
            let ctx = norma_cli::wiring::stage_context(&config).await?;
            let targets = select_targets(&ctx, only_norma, all).await?;
            run_over(&ctx, targets.clone(), concurrency, fail_on_errors, cli.global.dry_run, cli.global.quiet, StageKind::BuildUnidades)
                .await?;
            run_over(&ctx, targets, concurrency, fail_on_errors, cli.global.dry_run, cli.global.quiet, StageKind::BuildChunks).await
        }
        Command::RagCheck { id_norma } => rag_check(&config, &id_norma).await,
    }
}

async fn select_targets(ctx: &norma_orchestrator::StageContext, only_norma: Option<String>, all: bool) -> anyhow::Result<Vec<String>> {
    select_targets_ranged(ctx, only_norma, all, None, None).await
}

async fn select_targets_ranged(
    ctx: &norma_orchestrator::StageContext,
    only_norma: Option<String>,
    all: bool,
    from: Option<String>,
    to: Option<String>,
) -> anyhow::Result<Vec<String>> {
    if let Some(id) = only_norma {
        return Ok(vec![id]);
    }
    if !all && from.is_none() && to.is_none() {
        anyhow::bail!("specify --only-norma, --all, or --from/--to");
    }
    let mut states = ctx.db.list_all_sync_states().await?;
    states.sort_by(|a, b| a.id_norma.cmp(&b.id_norma));
    Ok(states
        .into_iter()
        .map(|state| state.id_norma)
        .filter(|id_norma| from.as_deref().is_none_or(|from| id_norma.as_str() >= from))
        .filter(|id_norma| to.as_deref().is_none_or(|to| id_norma.as_str() <= to))
        .collect())
}

#[derive(Clone, Copy)]
enum StageKind {
    BuildUnidades,
    BuildChunks,
}

#[allow(clippy::too_many_arguments)]
async fn run_over(
    ctx: &norma_orchestrator::StageContext,
    targets: Vec<String>,
    concurrency: usize,
    fail_on_errors: bool,
    dry_run: bool,
    quiet: bool,
    stage: StageKind,
) -> anyhow::Result<()> {
    info!(count = targets.len(), "processing norms");
    if dry_run {
        for id_norma in &targets {
            info!(id_norma, "would process (dry run)");
        }
        return Ok(());
    }

    let progress = norma_cli::Progress::bar(quiet, targets.len() as u64, "processing norms");
    let concurrency = concurrency.max(1);
    let results: Vec<(String, Result<(), norma_orchestrator::OrchestratorError>)> = stream::iter(targets)
        .map(|id_norma| async move {
            let result = match stage {
                StageKind::BuildUnidades => run_build_units_stage(ctx, &id_norma).await,
                StageKind::BuildChunks => run_build_chunks_stage(ctx, &id_norma).await,
            };
            (id_norma, result)
        })
        .buffer_unordered(concurrency)
        .inspect(|_| progress.inc(1))
        .collect()
        .await;

    let mut failures = 0usize;
    for (id_norma, result) in &results {
        match result {
            Ok(()) => info!(id_norma, "ok"),
            Err(error) => {
                failures += 1;
                warn!(id_norma, %error, "failed");
            }
        }
    }

    if failures > 0 {
        progress.finish_err(&format!("{failures} of {} norms failed", results.len()));
    } else {
        progress.finish_ok(&format!("{} norms processed", results.len()));
    }

    info!(total = results.len(), failures, "complete");
    if fail_on_errors && failures > 0 {
        return Err(norma_cli::PartialFailure { failed: failures, total: results.len() }.into());
    }
    Ok(())
}

async fn rag_check(config: &NormaConfig, id_norma: &str) -> anyhow::Result<()> {
    let db = norma_cli::wiring::open_db(config).await?;
    let state = db.find_sync_state(id_norma).await?;
    let lineages = db.distinct_lineage_keys(id_norma).await?;

    let mut unit_count = 0usize;
    for lineage_key in &lineages {
        unit_count += db.list_unidades_by_lineage(lineage_key).await?.len();
    }
    let chunk_count = db.list_chunks_ordered(Some(id_norma)).await?.len();

    println!(
        "{}",
        serde_json::json!({
            "idNorma": id_norma,
            "rollup": state.as_ref().map(|s| s.rollup.as_str()),
            "lineages": lineages.len(),
            "unidades": unit_count,
            "chunks": chunk_count,
        })
    );
    Ok(())
}
