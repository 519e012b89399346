//! `norma-indexer`: embed and upsert chunks into the vector store, then
//! prune stale points. A thin CLI wrapper over
//! [`norma_vector::run_indexer`].

use clap::Parser;
use norma_cli::GlobalFlags;
use norma_config::NormaConfig;
use norma_vector::{run_indexer, IndexerOptions};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "norma-indexer", about = "Embed chunks into the vector store and prune stale points")]
struct Cli {
    #[command(flatten)]
    global: GlobalFlags,

    /// Restrict indexing to this norm; omit to index every chunk.
    #[arg(long)]
    only_norma: Option<String>,

    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    #[arg(long, default_value_t = 8)]
    embed_concurrency: usize,

    /// Cap the run to the first N chunks. Disables cleanup.
    #[arg(long)]
    limit: Option<usize>,

    /// Skip the post-index cleanup pass even when `--limit` is unset.
    #[arg(long)]
    no_cleanup: bool,

    #[arg(long, default_value_t = 256)]
    cleanup_scroll_batch_size: usize,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("norma-indexer error: {error:#}");
        std::process::exit(norma_cli::exit_code_for(&error));
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    norma_cli::init_tracing(cli.global.quiet, cli.global.verbose)?;
    let config = NormaConfig::load()?;

    let db = norma_cli::wiring::open_db(&config).await?;
    let embedder = norma_cli::wiring::embedder(&config);
    let vector = norma_cli::wiring::vector_client(&config);

    let options = IndexerOptions {
        batch_size: cli.batch_size,
        embed_concurrency: cli.embed_concurrency,
        limit: if cli.no_cleanup { cli.limit.or(Some(usize::MAX)) } else { cli.limit },
        cleanup_scroll_batch_size: cli.cleanup_scroll_batch_size,
    };

    if cli.global.dry_run {
        info!(only_norma = ?cli.only_norma, ?options, "would run indexer (dry run)");
        return Ok(());
    }

    let progress = norma_cli::Progress::spinner(cli.global.quiet, "embedding and indexing chunks");
    let stats = run_indexer(&db, &embedder, &vector, cli.only_norma.as_deref(), options).await?;
    progress.finish_ok(&format!("{} embedded, {} skipped, {} deleted", stats.embedded, stats.skipped_unchanged, stats.deleted));
    println!(
        "{}",
        serde_json::json!({
            "seen": stats.seen,
            "embedded": stats.embedded,
            "skippedUnchanged": stats.skipped_unchanged,
            "deleted": stats.deleted,
        })
    );
    Ok(())
}
