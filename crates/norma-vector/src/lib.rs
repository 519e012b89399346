//! # norma-vector
//!
//! Qdrant-REST-style vector store client and the chunk indexer that keeps it
//! in sync with the doc store.

pub mod client;
pub mod config;
pub mod error;
pub mod indexer;
pub mod payload;

pub use client::{ScoredPoint, VectorStoreClient};
pub use config::VectorStoreConfig;
pub use error::VectorError;
pub use indexer::{IndexerOptions, IndexerStats, run_indexer};
pub use payload::{PayloadFingerprint, PointPayload, VIGENCIA_HASTA_SENTINEL_MS, point_id_for_chunk};
