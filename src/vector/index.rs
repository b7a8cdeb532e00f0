//! Nearest-neighbor index abstraction and the exact flat implementation.
//!
//! The [`VectorIndex`] trait is the seam between the retrieval pipeline and
//! the concrete nearest-neighbor structure: fusion and orchestration only
//! see `search`, so a quantized or graph-based backend can replace the flat
//! scan without touching them.

use rayon::prelude::*;

use crate::error::{DalilError, Result};
use crate::util::simd;
use crate::vector::Vector;

/// A scored vector hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorHit {
    /// Chunk id.
    pub chunk_id: u64,
    /// Cosine similarity to the query, in [-1, 1].
    pub similarity: f32,
}

/// Minimal nearest-neighbor index interface.
pub trait VectorIndex: Send + Sync {
    /// Embedding dimension the index was built for.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a chunk's embedding. The vector is L2-normalized on insert.
    fn add(&mut self, chunk_id: u64, vector: Vector) -> Result<()>;

    /// Return the `limit` nearest chunks by cosine similarity, descending,
    /// ties broken by chunk id ascending.
    fn search(&self, query: &Vector, limit: usize) -> Result<Vec<VectorHit>>;
}

/// Exact nearest-neighbor index backed by a brute-force scan.
///
/// Rows are stored contiguously and L2-normalized, so cosine similarity
/// reduces to a dot product. The scan parallelizes across rows with rayon.
#[derive(Debug, Clone, Default)]
pub struct FlatVectorIndex {
    dimension: usize,
    ids: Vec<u64>,
    rows: Vec<f32>,
}

impl FlatVectorIndex {
    /// Create an empty index for the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ids: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Iterate over stored (chunk id, normalized row) pairs in insertion
    /// order. Used by the artifact writer.
    pub fn iter_rows(&self) -> impl Iterator<Item = (u64, &[f32])> {
        self.ids
            .iter()
            .copied()
            .zip(self.rows.chunks_exact(self.dimension.max(1)))
    }
}

impl VectorIndex for FlatVectorIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn add(&mut self, chunk_id: u64, vector: Vector) -> Result<()> {
        if vector.dimension() != self.dimension {
            return Err(DalilError::validation(format!(
                "vector for chunk {chunk_id} has dimension {}, index expects {}",
                vector.dimension(),
                self.dimension
            )));
        }

        let normalized = vector.normalized();
        self.ids.push(chunk_id);
        self.rows.extend_from_slice(&normalized.data);
        Ok(())
    }

    fn search(&self, query: &Vector, limit: usize) -> Result<Vec<VectorHit>> {
        if query.dimension() != self.dimension {
            return Err(DalilError::validation(format!(
                "query vector has dimension {}, index expects {}",
                query.dimension(),
                self.dimension
            )));
        }
        if limit == 0 || self.ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = query.clone().normalized();
        let mut hits: Vec<VectorHit> = self
            .ids
            .par_iter()
            .zip(self.rows.par_chunks_exact(self.dimension))
            .map(|(&chunk_id, row)| VectorHit {
                chunk_id,
                similarity: simd::dot_f32(&query.data, row),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatVectorIndex {
        let mut index = FlatVectorIndex::new(3);
        index.add(1, Vector::new(vec![1.0, 0.0, 0.0])).unwrap();
        index.add(2, Vector::new(vec![0.0, 1.0, 0.0])).unwrap();
        index.add(3, Vector::new(vec![0.7, 0.7, 0.0])).unwrap();
        index
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = index();
        let hits = index
            .search(&Vector::new(vec![1.0, 0.0, 0.0]), 3)
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].chunk_id, 1);
        assert!((hits[0].similarity - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].chunk_id, 3);
        assert_eq!(hits[2].chunk_id, 2);
    }

    #[test]
    fn test_search_respects_limit() {
        let index = index();
        let hits = index.search(&Vector::new(vec![1.0, 1.0, 0.0]), 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_tie_break_by_chunk_id() {
        let mut index = FlatVectorIndex::new(2);
        index.add(8, Vector::new(vec![1.0, 0.0])).unwrap();
        index.add(2, Vector::new(vec![1.0, 0.0])).unwrap();

        let hits = index.search(&Vector::new(vec![1.0, 0.0]), 2).unwrap();
        assert_eq!(hits[0].chunk_id, 2);
        assert_eq!(hits[1].chunk_id, 8);
    }

    #[test]
    fn test_rows_are_normalized_on_insert() {
        let mut index = FlatVectorIndex::new(2);
        index.add(1, Vector::new(vec![10.0, 0.0])).unwrap();

        let (_, row) = index.iter_rows().next().unwrap();
        assert!((row[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut index = FlatVectorIndex::new(3);
        assert!(index.add(1, Vector::new(vec![1.0, 2.0])).is_err());
        assert!(
            index
                .search(&Vector::new(vec![1.0, 2.0]), 5)
                .is_err()
        );
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = FlatVectorIndex::new(4);
        let hits = index
            .search(&Vector::new(vec![1.0, 0.0, 0.0, 0.0]), 5)
            .unwrap();
        assert!(hits.is_empty());
    }
}
