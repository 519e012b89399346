//! Parser error types for norma-parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("malformed date token '{0}'")]
    MalformedDate(String),

    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("malformed discover JSON: {0}")]
    MalformedJson(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
