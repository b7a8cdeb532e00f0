//! Lookup-table embedder over known texts.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::analysis::normalize;
use crate::embedding::Embedder;
use crate::error::{DalilError, Result};
use crate::vector::Vector;

/// Embedder backed by a fixed text → vector table.
///
/// Texts are keyed by their normalized form, so callers may register either
/// raw or normalized text. Unknown texts are an error, which makes this
/// provider useful for tests that need exact control over the vector space
/// and for replaying embeddings computed by an external model.
#[derive(Debug, Clone)]
pub struct PrecomputedEmbedder {
    dimension: usize,
    table: HashMap<String, Vector>,
}

impl PrecomputedEmbedder {
    /// Create an empty table for the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            table: HashMap::new(),
        }
    }

    /// Register a text → vector entry. Rejects dimension mismatches.
    pub fn insert<S: AsRef<str>>(&mut self, text: S, vector: Vector) -> Result<()> {
        if vector.dimension() != self.dimension {
            return Err(DalilError::embedding(format!(
                "precomputed vector has dimension {}, expected {}",
                vector.dimension(),
                self.dimension
            )));
        }
        self.table.insert(normalize(text.as_ref()), vector);
        Ok(())
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[async_trait]
impl Embedder for PrecomputedEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &'static str {
        "precomputed"
    }

    async fn embed(&self, text: &str) -> Result<Vector> {
        self.table
            .get(&normalize(text))
            .cloned()
            .ok_or_else(|| DalilError::embedding("text not present in precomputed table"))
    }
}
