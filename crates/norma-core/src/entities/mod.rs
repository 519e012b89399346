//! Entity structs for all persisted domain objects.
//!
//! Each struct maps to a table in `norma-db` (see its `migrations/001_initial.sql`).
//! All structs derive `Serialize`/`Deserialize` for JSON round-trip through the
//! vector store payload and the retrieval HTTP surface.

mod bloque;
mod chunk;
mod indice;
mod norma;
mod sync_state;
mod territorio;
mod unidad;
mod version;

pub use bloque::Bloque;
pub use chunk::{ChunkMetadataSnapshot, ChunkingConfig, ChunkSemantico};
pub use indice::Indice;
pub use norma::Norma;
pub use sync_state::{StageRow, SyncState};
pub use territorio::TerritorioCatalog;
pub use unidad::{Quality, Source as UnidadSource, Unidad, UnidadMetadata};
pub use version::Version;
