//! # norma-semantic
//!
//! Turns a norm's index-block tree plus its per-block version history into
//! the small set of versioned semantic units (articles, dispositions,
//! annexes, preamble) that the rest of the pipeline chunks, embeds, and
//! serves. [`builder::build_candidates`] is the entry point;
//! [`postprocess::finalize`] applies the per-norm dedup/`is_latest` pass
//! once candidates for all of a norm's roots have been built.

pub mod anchor;
pub mod builder;
pub mod classify;
pub mod derived;
pub mod error;
pub mod filter;
pub mod ids;
pub mod postprocess;
pub mod territorio_catalog;
pub mod text;
pub mod tree;
pub mod version_select;
pub mod vigencia;

pub use builder::build_candidates;
pub use error::SemanticError;
pub use postprocess::finalize;
pub use vigencia::{derive_closure, is_active_at};
