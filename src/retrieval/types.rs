//! Request and result types for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::access::Role;

/// A single retrieval request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Raw query text.
    pub query: String,
    /// Roles held by the requester, as resolved by the authorization
    /// collaborator. Must be non-empty.
    pub roles: Vec<Role>,
    /// Number of results to return.
    pub top_k: usize,
    /// Width of the lexical candidate pool.
    pub bm25_k: usize,
    /// Width of the vector candidate pool.
    pub vec_k: usize,
    /// Fusion weight for the vector modality, in [0, 1].
    pub alpha: f32,
}

impl RetrievalRequest {
    /// Create a request with the crate's default pool widths and weight.
    pub fn new<S: Into<String>>(query: S, roles: Vec<Role>) -> Self {
        Self {
            query: query.into(),
            roles,
            top_k: 5,
            bm25_k: 50,
            vec_k: 50,
            alpha: 0.5,
        }
    }

    /// Set the number of results to return.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the lexical candidate pool width.
    pub fn with_bm25_k(mut self, bm25_k: usize) -> Self {
        self.bm25_k = bm25_k;
        self
    }

    /// Set the vector candidate pool width.
    pub fn with_vec_k(mut self, vec_k: usize) -> Self {
        self.vec_k = vec_k;
        self
    }

    /// Set the fusion weight.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// One visible result item.
///
/// Carries only chunk metadata the requester is allowed to see; hidden
/// chunks never materialize as items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
    /// Chunk id.
    pub chunk_id: u64,
    /// Source document name.
    pub doc_name: String,
    /// Article reference, when known.
    pub article_ref: Option<String>,
    /// Page number in the source document.
    pub page: u32,
    /// Leading excerpt of the chunk text.
    pub snippet: String,
    /// Fused relevance score in [0, 1].
    pub fused_score: f32,
}

/// Ordered visible results plus the hidden-candidate count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Visible items, best first, at most `top_k`.
    pub items: Vec<RetrievedItem>,
    /// Number of candidates the access filter removed from the
    /// pre-truncation fused list.
    pub hidden_count: usize,
}
