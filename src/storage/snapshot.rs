//! The immutable serving snapshot.

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::config::RetrievalConfig;
use crate::corpus::{Chunk, CorpusStore};
use crate::embedding::Embedder;
use crate::error::{DalilError, Result};
use crate::lexical::LexicalIndex;
use crate::storage::artifacts::{
    self, FORMAT_VERSION, IndexManifest,
};
use crate::vector::{FlatVectorIndex, VectorIndex};

/// Everything a retrieval request reads: corpus table, lexical index, and
/// vector index, plus the manifest they were built under.
///
/// Snapshots are immutable after construction. The engine shares one behind
/// an `Arc` and hot-reload replaces the whole snapshot atomically, so
/// in-flight requests keep the snapshot they started with.
#[derive(Debug)]
pub struct IndexSnapshot {
    /// Index-wide metadata.
    pub manifest: IndexManifest,
    /// Chunk table.
    pub corpus: CorpusStore,
    /// BM25 inverted index.
    pub lexical: LexicalIndex,
    /// Vector index over chunk embeddings.
    pub vectors: FlatVectorIndex,
}

impl IndexSnapshot {
    /// Build a snapshot from chunks, embedding each chunk's normalized text
    /// through the given provider.
    ///
    /// This is the in-memory build contract the offline pipeline drives;
    /// batch orchestration (extraction, chunking, scheduling) lives outside
    /// the crate.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        let corpus = CorpusStore::new(chunks)?;
        let lexical = LexicalIndex::build(&corpus, config.bm25);

        let mut vectors = FlatVectorIndex::new(embedder.dimension());
        for chunk in corpus.iter() {
            let embedding = embedder.embed(&chunk.normalized_text).await?;
            vectors.add(chunk.id, embedding)?;
        }

        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            built_at: Utc::now(),
            chunk_count: corpus.len() as u64,
            embedding_dimension: embedder.dimension(),
            embedder: embedder.name().to_string(),
            bm25: config.bm25,
        };

        info!(
            chunks = corpus.len(),
            dimension = embedder.dimension(),
            "built index snapshot"
        );

        Ok(Self {
            manifest,
            corpus,
            lexical,
            vectors,
        })
    }

    /// Persist all artifacts into `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        artifacts::write_manifest(dir, &self.manifest)?;
        artifacts::write_corpus(dir, &self.corpus)?;
        artifacts::write_lexical(dir, &self.lexical)?;
        artifacts::write_vectors(dir, &self.vectors)?;
        Ok(())
    }

    /// Load and cross-validate all artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest = artifacts::read_manifest(dir)?;
        let corpus = artifacts::read_corpus(dir)?;
        let lexical = artifacts::read_lexical(dir)?;
        let vectors = artifacts::read_vectors(dir)?;

        if corpus.len() as u64 != manifest.chunk_count {
            return Err(DalilError::index_unavailable(format!(
                "corpus has {} chunks, manifest says {}",
                corpus.len(),
                manifest.chunk_count
            )));
        }
        if vectors.dimension() != manifest.embedding_dimension {
            return Err(DalilError::index_unavailable(format!(
                "vector artifact dimension {} does not match manifest {}",
                vectors.dimension(),
                manifest.embedding_dimension
            )));
        }
        if vectors.len() != corpus.len() {
            return Err(DalilError::index_unavailable(format!(
                "vector artifact has {} rows, corpus has {} chunks",
                vectors.len(),
                corpus.len()
            )));
        }
        for (chunk_id, _) in vectors.iter_rows() {
            if corpus.get(chunk_id).is_none() {
                return Err(DalilError::index_unavailable(format!(
                    "vector artifact references unknown chunk {chunk_id}"
                )));
            }
        }

        info!(
            chunks = corpus.len(),
            dimension = vectors.dimension(),
            "loaded index snapshot"
        );

        Ok(Self {
            manifest,
            corpus,
            lexical,
            vectors,
        })
    }
}
