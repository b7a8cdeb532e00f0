//! Inverted index construction and collection statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenize;
use crate::corpus::CorpusStore;

/// BM25 ranking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Chunk-length normalization strength.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Bm25Params { k1: 1.5, b: 0.75 }
    }
}

/// A single posting: a chunk containing the term, with its frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Chunk id.
    pub chunk_id: u64,
    /// Occurrences of the term in the chunk.
    pub term_freq: u32,
}

/// Summary statistics for an index, used by inspection tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalStats {
    /// Number of indexed chunks.
    pub chunk_count: u64,
    /// Number of distinct terms.
    pub term_count: u64,
    /// Average chunk length in tokens.
    pub avg_chunk_length: f32,
}

/// Immutable inverted index over normalized chunk text.
///
/// Postings within each term are kept sorted by chunk id ascending, which
/// makes scoring iteration (and therefore tie handling downstream) fully
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalIndex {
    pub(crate) params: Bm25Params,
    pub(crate) postings: HashMap<String, Vec<Posting>>,
    pub(crate) chunk_lengths: HashMap<u64, u32>,
    pub(crate) avg_chunk_length: f32,
    pub(crate) chunk_count: u64,
}

impl LexicalIndex {
    /// Build an index from the corpus's normalized chunk text.
    ///
    /// Tokenization re-runs the normalization chain; since normalization is
    /// idempotent this yields the same terms the offline pipeline saw.
    pub fn build(corpus: &CorpusStore, params: Bm25Params) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut chunk_lengths = HashMap::with_capacity(corpus.len());
        let mut total_length: u64 = 0;

        for chunk in corpus.iter() {
            let tokens = tokenize(&chunk.normalized_text);
            let length = tokens.len() as u32;
            chunk_lengths.insert(chunk.id, length);
            total_length += u64::from(length);

            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for (term, term_freq) in freqs {
                postings.entry(term).or_default().push(Posting {
                    chunk_id: chunk.id,
                    term_freq,
                });
            }
        }

        // Corpus iteration is id-ordered, but keep the invariant explicit.
        for list in postings.values_mut() {
            list.sort_by_key(|p| p.chunk_id);
        }

        let chunk_count = corpus.len() as u64;
        let avg_chunk_length = if chunk_count > 0 {
            total_length as f32 / chunk_count as f32
        } else {
            0.0
        };

        Self {
            params,
            postings,
            chunk_lengths,
            avg_chunk_length,
            chunk_count,
        }
    }

    /// The BM25 parameters the index was built with.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Document frequency of a term.
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.postings.get(term).map_or(0, |p| p.len() as u64)
    }

    /// Summary statistics.
    pub fn stats(&self) -> LexicalStats {
        LexicalStats {
            chunk_count: self.chunk_count,
            term_count: self.postings.len() as u64,
            avg_chunk_length: self.avg_chunk_length,
        }
    }
}
