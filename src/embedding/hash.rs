//! Deterministic feature-hashing embedder.

use std::hash::Hasher;

use async_trait::async_trait;
use twox_hash::XxHash64;

use crate::analysis::tokenize;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector::Vector;

/// Feature-hashing text embedder.
///
/// Each analysis token is hashed with a fixed-seed XxHash64; the low bits
/// pick a bucket and the high bits contribute a weight. The output is
/// L2-normalized. The construction is stable across processes, which is
/// what lets embeddings persisted in index artifacts be compared against
/// query-time embeddings. It captures token overlap only, not semantics,
/// and exists for smoke tests, benches, and CLI use without a model.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder producing `dimension`-sized vectors.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_sync(&self, text: &str) -> Vector {
        let mut data = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let h = hasher.finish();

            let bucket = (h as usize) % self.dimension;
            let weight = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            data[bucket] += weight + 1.0;
        }

        Vector::new(data).normalized()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &'static str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.embed_sync(text))
    }
}
