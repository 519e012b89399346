//! Chunking configuration and its content hash.

use norma_core::enums::ChunkMethod;
use norma_core::ids::compose_hash;

/// `{method, chunk_size, overlap}` — the configuration a set of chunks was
/// produced under. `chunking_hash` changes whenever any field changes,
/// invalidating previously-produced chunks for the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    pub method: ChunkMethod,
    pub chunk_size: usize,
    pub overlap: usize,
}

impl ChunkConfig {
    /// `chunking_hash = H(method, size, overlap)`.
    #[must_use]
    pub fn chunking_hash(&self) -> String {
        compose_hash(&[self.method.as_str(), &self.chunk_size.to_string(), &self.overlap.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_changes_with_any_field() {
        let base = ChunkConfig { method: ChunkMethod::Simple, chunk_size: 1000, overlap: 100 };
        let different_size = ChunkConfig { chunk_size: 900, ..base };
        let different_overlap = ChunkConfig { overlap: 50, ..base };
        let different_method = ChunkConfig { method: ChunkMethod::Recursive, ..base };
        assert_ne!(base.chunking_hash(), different_size.chunking_hash());
        assert_ne!(base.chunking_hash(), different_overlap.chunking_hash());
        assert_ne!(base.chunking_hash(), different_method.chunking_hash());
    }

    #[test]
    fn hash_is_deterministic() {
        let a = ChunkConfig { method: ChunkMethod::Simple, chunk_size: 1000, overlap: 100 };
        let b = a;
        assert_eq!(a.chunking_hash(), b.chunking_hash());
    }
}
