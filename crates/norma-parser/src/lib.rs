//! # norma-parser
//!
//! Normalizers that turn the source API's wire formats into language-neutral
//! value objects: discover-JSON into a [`norma_core::entities::Norma`]
//! candidate, index-XML into an ordered block list, bloque-XML into a
//! block's version history with content-stable raw XML slices. Also owns
//! domain date-token parsing and territorio resolution.

pub mod bloque_xml;
pub mod dates;
pub mod discover;
pub mod error;
pub mod index_xml;
pub mod territorio;

pub use bloque_xml::{parse_bloque_xml, BloqueDocument, VersionSlice};
pub use error::ParserError;
pub use index_xml::{parse_index_xml, BlockDescriptor, IndexDocument};
pub use territorio::ResolvedTerritorio;
