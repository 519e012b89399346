//! # norma-cli
//!
//! Shared bootstrap for the four pipeline binaries (`norma-ingestor`,
//! `norma-builder`, `norma-indexer`, `norma-pipeline`): tracing setup,
//! config loading, and the conversions from [`norma_config::NormaConfig`]
//! into each crate's own runtime config struct (every downstream crate
//! mirrors the config section it cares about rather than depending on
//! `norma-config` directly, so this is the one place those conversions
//! happen).

pub mod global;
pub mod progress;
pub mod wiring;

pub use global::GlobalFlags;
pub use progress::Progress;

/// Raised by `--fail-on-errors` when every norm ran but some failed, so
/// `main` can tell a crash apart from a partial run and exit 2 instead of 1.
#[derive(Debug, thiserror::Error)]
#[error("{failed} of {total} norms failed")]
pub struct PartialFailure {
    pub failed: usize,
    pub total: usize,
}

/// Exit code for a top-level `anyhow::Error`: 2 for a [`PartialFailure`], 1 for anything else.
#[must_use]
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<PartialFailure>().is_some() { 2 } else { 1 }
}

/// Initialize the tracing subscriber from `NORMA_LOG`, falling back to a
/// level derived from `--quiet`/`--verbose`.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("NORMA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
