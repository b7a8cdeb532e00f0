//! Embedding providers.
//!
//! The [`Embedder`] trait is the crate's boundary to whatever turns text
//! into dense vectors. The same provider instance must be used for indexing
//! and querying, otherwise the two vector spaces are not comparable. The
//! call is treated as external and bounded-latency; the retrieval engine
//! wraps it in a timeout.
//!
//! Two providers ship in-crate: [`HashEmbedder`], a deterministic
//! feature-hashing embedder useful for smoke tests and offline tooling, and
//! [`PrecomputedEmbedder`], a lookup table over known texts. Model-backed
//! providers live outside the crate, behind the same trait.

pub mod hash;
pub mod precomputed;

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::Vector;

pub use hash::HashEmbedder;
pub use precomputed::PrecomputedEmbedder;

/// Text → fixed-dimension vector provider.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding dimension this provider produces.
    fn dimension(&self) -> usize;

    /// Short provider family name, recorded in the index manifest so
    /// query-time code can reconstruct a compatible provider.
    fn name(&self) -> &'static str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vector>;
}
