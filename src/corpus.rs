//! The chunk corpus: immutable retrieval units and their access metadata.
//!
//! Chunks are produced once by the offline indexing pipeline and never
//! mutated at query time. The filename-based restriction rule is evaluated
//! exactly once, when a chunk is constructed, and persisted as the chunk's
//! `required_roles` attribute; query-time code only intersects role sets.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::access::Role;
use crate::analysis::normalize;
use crate::error::{DalilError, Result};

/// Case-insensitive filename marker for restricted documents.
pub const RESTRICTED_MARKER: &str = "restricted";

/// Maximum snippet length, in grapheme clusters.
pub const SNIPPET_MAX_GRAPHEMES: usize = 400;

/// Metadata derived from a source document's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Source document name, e.g. `"nuclear_law.pdf"`.
    pub name: String,
    /// Whether the document name carries the restriction marker.
    pub restricted: bool,
}

impl DocumentMeta {
    /// Derive metadata from a document name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        let restricted = name.to_lowercase().contains(RESTRICTED_MARKER);
        Self { name, restricted }
    }
}

/// Roles required to see chunks of the named document.
///
/// Restricted documents are readable by legal and admin only; everything
/// else is open to all three corpus roles.
pub fn required_roles_for(doc_name: &str) -> Vec<Role> {
    if DocumentMeta::new(doc_name).restricted {
        vec![Role::Legal, Role::Admin]
    } else {
        vec![Role::Staff, Role::Legal, Role::Admin]
    }
}

/// An immutable retrieval unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Globally unique chunk id.
    pub id: u64,
    /// Source document name.
    pub doc_name: String,
    /// Article reference within the source document, when known.
    #[serde(default)]
    pub article_ref: Option<String>,
    /// Page number in the source document.
    pub page: u32,
    /// Raw chunk text.
    pub text: String,
    /// Canonicalized chunk text, produced by [`normalize`] at build time.
    pub normalized_text: String,
    /// Roles allowed to see this chunk. Non-empty, sorted.
    pub required_roles: Vec<Role>,
}

impl Chunk {
    /// Create a chunk, deriving `normalized_text` and `required_roles`.
    pub fn new<D: Into<String>, T: Into<String>>(
        id: u64,
        doc_name: D,
        article_ref: Option<String>,
        page: u32,
        text: T,
    ) -> Self {
        let doc_name = doc_name.into();
        let text = text.into();
        let normalized_text = normalize(&text);
        let mut required_roles = required_roles_for(&doc_name);
        required_roles.sort();

        Self {
            id,
            doc_name,
            article_ref,
            page,
            text,
            normalized_text,
            required_roles,
        }
    }

    /// Result snippet: the leading part of the raw text with newlines folded
    /// to spaces, truncated at a grapheme boundary.
    pub fn snippet(&self) -> String {
        let folded = self.text.replace(['\n', '\r'], " ");
        let truncated: String = folded
            .graphemes(true)
            .take(SNIPPET_MAX_GRAPHEMES)
            .collect();
        truncated.trim().to_string()
    }
}

/// In-memory chunk table with id lookup.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    chunks: Vec<Chunk>,
    by_id: AHashMap<u64, usize>,
}

impl CorpusStore {
    /// Build a store from chunks, rejecting duplicate ids.
    pub fn new(mut chunks: Vec<Chunk>) -> Result<Self> {
        chunks.sort_by_key(|c| c.id);

        let mut by_id = AHashMap::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            if chunk.required_roles.is_empty() {
                return Err(DalilError::validation(format!(
                    "chunk {} has an empty required_roles set",
                    chunk.id
                )));
            }
            if by_id.insert(chunk.id, idx).is_some() {
                return Err(DalilError::validation(format!(
                    "duplicate chunk id {}",
                    chunk.id
                )));
            }
        }

        Ok(Self { chunks, by_id })
    }

    /// Look up a chunk by id.
    pub fn get(&self, id: u64) -> Option<&Chunk> {
        self.by_id.get(&id).map(|&idx| &self.chunks[idx])
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterate chunks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }
}
