//! Flags shared by every binary in this crate.

use clap::Args;

/// Output/verbosity flags every subcommand accepts ahead of its own args.
#[derive(Args, Clone, Debug)]
pub struct GlobalFlags {
    /// Suppress all but error-level logging.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable debug-level logging.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Compute and print the outcome without writing to the database, object store, or vector store.
    #[arg(long, global = true)]
    pub dry_run: bool,
}
