//! Retrieval engine implementation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::access::{AccessFilter, RoleHierarchy};
use crate::analysis::{Glossary, normalize, tokenize};
use crate::config::{EmbeddingFallback, RetrievalConfig};
use crate::embedding::Embedder;
use crate::error::{DalilError, Result};
use crate::fusion::FusionRanker;
use crate::retrieval::types::{RetrievalRequest, RetrievalResult, RetrievedItem};
use crate::storage::IndexSnapshot;
use crate::vector::{Vector, VectorHit, VectorIndex};

/// Hybrid retrieval engine with integrated access control.
///
/// The engine owns an immutable [`IndexSnapshot`] behind an atomic swap:
/// each request clones the `Arc` on entry, so requests are stateless, run
/// safely in parallel, and a hot [`reload`](Self::reload) never disturbs a
/// request already in flight.
pub struct RetrievalEngine {
    config: RetrievalConfig,
    glossary: Glossary,
    filter: AccessFilter,
    embedder: Arc<dyn Embedder>,
    snapshot: RwLock<Arc<IndexSnapshot>>,
}

impl RetrievalEngine {
    /// Create an engine over a loaded snapshot.
    ///
    /// The embedding provider must match the dimension the artifacts were
    /// built with; anything else would compare incompatible vector spaces.
    pub fn new(
        snapshot: IndexSnapshot,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
        glossary: Glossary,
        hierarchy: RoleHierarchy,
    ) -> Result<Self> {
        config.validate()?;
        Self::check_dimension(&snapshot, embedder.as_ref())?;

        Ok(Self {
            config,
            glossary,
            filter: AccessFilter::new(hierarchy),
            embedder,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    fn check_dimension(snapshot: &IndexSnapshot, embedder: &dyn Embedder) -> Result<()> {
        if snapshot.vectors.dimension() != embedder.dimension() {
            return Err(DalilError::index_unavailable(format!(
                "embedder produces {}-dimensional vectors, index was built with {}",
                embedder.dimension(),
                snapshot.vectors.dimension()
            )));
        }
        Ok(())
    }

    /// The snapshot currently serving requests.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot.read().clone()
    }

    /// Atomically replace the serving snapshot.
    pub fn reload(&self, snapshot: IndexSnapshot) -> Result<()> {
        Self::check_dimension(&snapshot, self.embedder.as_ref())?;
        let chunks = snapshot.corpus.len();
        *self.snapshot.write() = Arc::new(snapshot);
        tracing::info!(chunks, "snapshot reloaded");
        Ok(())
    }

    /// Run one retrieval request through the pipeline.
    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalResult> {
        self.validate_request(request)?;
        let snapshot = self.snapshot();

        // NORMALIZE + EXPAND_SYNONYMS.
        let normalized_query = normalize(&request.query);
        let tokens = tokenize(&normalized_query);
        let expanded = self.glossary.expand(&tokens);
        debug!(
            tokens = tokens.len(),
            expanded = expanded.len(),
            "analyzed query"
        );

        // RETRIEVE: both modalities run concurrently against the same
        // snapshot clone.
        let lexical_task = {
            let snapshot = Arc::clone(&snapshot);
            let tokens = expanded.clone();
            let limit = request.bm25_k;
            tokio::task::spawn_blocking(move || snapshot.lexical.search(&tokens, limit))
        };
        let vector_future = async {
            let query_vector = self.embed_query(&normalized_query).await?;
            snapshot.vectors.search(&query_vector, request.vec_k)
        };

        let (lexical_join, vector_result) = tokio::join!(lexical_task, vector_future);
        let lexical_hits = lexical_join
            .map_err(|e| DalilError::other(format!("lexical search task failed: {e}")))?;
        let vector_hits = self.resolve_vector_result(vector_result)?;

        debug!(
            lexical = lexical_hits.len(),
            vector = vector_hits.len(),
            "retrieved candidate pools"
        );

        // FUSE.
        let ranker = FusionRanker::new(request.alpha, self.config.normalization);
        let fused = ranker.fuse(&lexical_hits, &vector_hits);

        // FILTER, then TRUNCATE. Order matters: hidden chunks must not
        // shrink the visible result while lower-ranked visible candidates
        // remain in the pool.
        let outcome = self.filter.filter(fused, &request.roles, |id| {
            snapshot.corpus.get(id).map(|c| c.required_roles.as_slice())
        });
        debug!(
            visible = outcome.visible.len(),
            hidden = outcome.hidden,
            "applied access filter"
        );

        let mut items = Vec::with_capacity(request.top_k.min(outcome.visible.len()));
        for candidate in outcome.visible.into_iter().take(request.top_k) {
            let chunk = snapshot.corpus.get(candidate.chunk_id).ok_or_else(|| {
                DalilError::index_unavailable(format!(
                    "fused candidate references unknown chunk {}",
                    candidate.chunk_id
                ))
            })?;
            items.push(RetrievedItem {
                chunk_id: chunk.id,
                doc_name: chunk.doc_name.clone(),
                article_ref: chunk.article_ref.clone(),
                page: chunk.page,
                snippet: chunk.snippet(),
                fused_score: candidate.fused_score,
            });
        }

        Ok(RetrievalResult {
            items,
            hidden_count: outcome.hidden,
        })
    }

    fn validate_request(&self, request: &RetrievalRequest) -> Result<()> {
        if request.query.trim().is_empty() {
            return Err(DalilError::validation("query is empty or whitespace-only"));
        }
        if request.roles.is_empty() {
            return Err(DalilError::authorization("no roles supplied"));
        }
        if request.top_k == 0 {
            return Err(DalilError::validation("top_k must be at least 1"));
        }
        if request.bm25_k == 0 || request.vec_k == 0 {
            return Err(DalilError::validation(
                "bm25_k and vec_k must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&request.alpha) {
            return Err(DalilError::validation(format!(
                "alpha must be in [0, 1], got {}",
                request.alpha
            )));
        }
        Ok(())
    }

    async fn embed_query(&self, text: &str) -> Result<Vector> {
        let timeout = Duration::from_millis(self.config.embedding_timeout_ms);
        match tokio::time::timeout(timeout, self.embedder.embed(text)).await {
            Ok(result) => result,
            Err(_) => Err(DalilError::embedding(format!(
                "embedding call timed out after {} ms",
                self.config.embedding_timeout_ms
            ))),
        }
    }

    /// Apply the configured fallback policy to the vector retrieval
    /// outcome. Only provider failures are eligible for degradation;
    /// index-side errors always surface.
    fn resolve_vector_result(&self, result: Result<Vec<VectorHit>>) -> Result<Vec<VectorHit>> {
        match result {
            Ok(hits) => Ok(hits),
            Err(DalilError::EmbeddingProvider(reason)) => match self.config.embedding_fallback {
                EmbeddingFallback::Bm25Only => {
                    warn!(%reason, "embedding unavailable, degrading to BM25-only ranking");
                    Ok(Vec::new())
                }
                EmbeddingFallback::Fail => Err(DalilError::EmbeddingProvider(reason)),
            },
            Err(other) => Err(other),
        }
    }
}
