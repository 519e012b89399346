//! `norma-ingestor`: discover norms from the source API and drive the sync
//! stage for them directly (no queue — see `norma-pipeline` for the queued,
//! backpressured version of this work).

use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use norma_cli::GlobalFlags;
use norma_config::NormaConfig;
use norma_orchestrator::workers::run_sync_stage;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "norma-ingestor", about = "Discover norms and run the sync stage")]
struct Cli {
    #[command(flatten)]
    global: GlobalFlags,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Page through the source API's discover endpoint and upsert every norm found.
    Discover {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        query: Option<String>,
        /// Stop after this many discovered norms.
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 100)]
        batch_size: u64,
    },
    /// Run the sync stage for one or more known norms.
    Sync {
        /// Sync a single norm.
        #[arg(long)]
        norma_id: Option<String>,
        /// Sync every known norm.
        #[arg(long)]
        all: bool,
        /// Restrict to norms whose id sorts at or after this value.
        #[arg(long)]
        from: Option<String>,
        /// Restrict to norms whose id sorts at or before this value.
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        max_normas: Option<usize>,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        /// Run `discover` with the same `--from`/`--to` before syncing.
        #[arg(long)]
        discover_first: bool,
        /// Exit non-zero if any norm's sync stage failed.
        #[arg(long)]
        fail_on_errors: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("norma-ingestor error: {error:#}");
        std::process::exit(norma_cli::exit_code_for(&error));
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    norma_cli::init_tracing(cli.global.quiet, cli.global.verbose)?;

    let config = NormaConfig::load()?;

    match cli.command {
        Command::Discover { from, to, query, limit, batch_size } => {
            discover(
                &config,
                from.as_deref(),
                to.as_deref(),
                query.as_deref(),
                limit,
                batch_size,
                cli.global.dry_run,
                cli.global.quiet,
            )
            .await
        }
        Command::Sync { norma_id, all, from, to, max_normas, concurrency, discover_first, fail_on_errors } => {
            if discover_first {
                discover(&config, from.as_deref(), to.as_deref(), None, None, 100, cli.global.dry_run, cli.global.quiet).await?;
            }
            sync(&config, norma_id, all, from, to, max_normas, concurrency, fail_on_errors, cli.global.dry_run).await
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn discover(
    config: &NormaConfig,
    from: Option<&str>,
    to: Option<&str>,
    query: Option<&str>,
    limit: Option<usize>,
    batch_size: u64,
    dry_run: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let db = norma_cli::wiring::open_db(config).await?;
    let source = norma_cli::wiring::source_client(config);
    let progress = norma_cli::Progress::spinner(quiet, "discovering norms");

    let mut offset = 0u64;
    let mut discovered = 0usize;
    loop {
        let now = chrono::Utc::now();
        let page = source.discover(from, to, offset, batch_size, query).await?;
        if page.items.is_empty() {
            break;
        }

        for raw in &page.items {
            let normalized = norma_parser::discover::normalize(raw, now)?;
            info!(id_norma = %normalized.id_norma, "discovered norm");
            if !dry_run {
                db.upsert_from_discover(normalized, now, false).await?;
            }
            discovered += 1;
            progress.set_message(&format!("{discovered} discovered"));
            progress.inc(1);
            if limit.is_some_and(|limit| discovered >= limit) {
                progress.finish_ok(&format!("{discovered} discovered (--limit reached)"));
                return Ok(());
            }
        }

        offset += page.items.len() as u64;
    }

    progress.finish_ok(&format!("{discovered} discovered"));
    info!(discovered, "discover complete");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn sync(
    config: &NormaConfig,
    norma_id: Option<String>,
    all: bool,
    from: Option<String>,
    to: Option<String>,
    max_normas: Option<usize>,
    concurrency: usize,
    fail_on_errors: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let ctx = norma_cli::wiring::stage_context(config).await?;

    let mut targets: Vec<String> = if let Some(id) = norma_id {
        vec![id]
    } else if all || from.is_some() || to.is_some() {
        let mut states = ctx.db.list_all_sync_states().await?;
        states.sort_by(|a, b| a.id_norma.cmp(&b.id_norma));
        states
            .into_iter()
            .map(|state| state.id_norma)
            .filter(|id_norma| from.as_deref().is_none_or(|from| id_norma.as_str() >= from))
            .filter(|id_norma| to.as_deref().is_none_or(|to| id_norma.as_str() <= to))
            .collect()
    } else {
        anyhow::bail!("sync requires --norma-id, --all, or --from/--to");
    };

    if let Some(max_normas) = max_normas {
        targets.truncate(max_normas);
    }

    info!(count = targets.len(), "syncing norms");
    if dry_run {
        for id_norma in &targets {
            info!(id_norma, "would sync (dry run)");
        }
        return Ok(());
    }

    let concurrency = concurrency.max(1);
    let results: Vec<(String, Result<(), norma_orchestrator::OrchestratorError>)> = stream::iter(targets)
        .map(|id_norma| {
            let ctx = &ctx;
            async move {
                let result = run_sync_stage(ctx, &id_norma).await;
                (id_norma, result)
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut failures = 0usize;
    for (id_norma, result) in &results {
        match result {
            Ok(()) => info!(id_norma, "sync ok"),
            Err(error) => {
                failures += 1;
                warn!(id_norma, %error, "sync failed");
            }
        }
    }

    info!(total = results.len(), failures, "sync complete");
    if fail_on_errors && failures > 0 {
        return Err(norma_cli::PartialFailure { failed: failures, total: results.len() }.into());
    }
    Ok(())
}
