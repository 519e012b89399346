//! # norma-embed
//!
//! Embedding client for the chunk indexer: a local HTTP backend
//! tolerant of two request-body shapes, a remote OpenAI-compatible backend,
//! and a fallback decorator that tries the primary backend (with retry)
//! before falling back to the secondary one.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod response;

pub use client::Embedder;
pub use config::{BackendConfig, BackendKind, EmbedderConfig};
pub use error::EmbedError;
