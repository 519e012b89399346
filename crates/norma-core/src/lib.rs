//! # norma-core
//!
//! Core types shared across the ingestion/indexing pipeline:
//! - Entity structs for all persisted domain objects (norma, indice, bloque,
//!   version, unidad, chunk_semantico, territorio, sync_state)
//! - Deterministic id composition and content hashing
//! - Stage/rollup status enums with their state machine
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
