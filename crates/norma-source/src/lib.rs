//! # norma-source
//!
//! HTTP client for the legal norm source API: discover/index/bloque
//! endpoints, each wrapped in bounded retry-with-backoff, plus the
//! retry helper shared with `norma-embed`'s backend calls.

pub mod client;
pub mod config;
pub mod retry;
pub mod status;
pub mod url;

mod error;
mod http;

pub use client::{DiscoverPage, SourceClient};
pub use config::SourceClientConfig;
pub use error::SourceError;
pub use retry::{BackoffConfig, Retryable, retry_with_backoff};
