//! BM25 scoring over the inverted index.

use ahash::AHashMap;

use crate::lexical::index::LexicalIndex;
use crate::util::simd;

/// A scored lexical hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalHit {
    /// Chunk id.
    pub chunk_id: u64,
    /// Raw (unbounded) BM25 score.
    pub score: f32,
}

impl LexicalIndex {
    /// Score the query tokens against the index and return the `limit`
    /// best chunks, descending by score, ties broken by chunk id ascending.
    ///
    /// Query tokens are expected to have gone through the same analysis
    /// chain as the index (normalization, tokenization, synonym expansion).
    /// Duplicate query tokens contribute once per occurrence, matching the
    /// classic Okapi treatment of query term frequency. A query with no
    /// matching term yields an empty list, not an error.
    pub fn search(&self, tokens: &[String], limit: usize) -> Vec<LexicalHit> {
        if limit == 0 || tokens.is_empty() || self.chunk_count == 0 {
            return Vec::new();
        }

        let total = self.chunk_count as f32;
        let mut scores: AHashMap<u64, f32> = AHashMap::new();

        for term in tokens {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };

            let df = postings.len() as f32;
            let idf = ((total - df + 0.5) / (df + 0.5) + 1.0).ln();

            let tfs: Vec<f32> = postings.iter().map(|p| p.term_freq as f32).collect();
            let lens: Vec<f32> = postings
                .iter()
                .map(|p| {
                    self.chunk_lengths
                        .get(&p.chunk_id)
                        .copied()
                        .unwrap_or(0) as f32
                })
                .collect();

            let tf_components =
                simd::bm25_tf_batch(&tfs, &lens, self.avg_chunk_length, self.params.k1, self.params.b);

            for (posting, tf_component) in postings.iter().zip(tf_components) {
                *scores.entry(posting.chunk_id).or_insert(0.0) += idf * tf_component;
            }
        }

        let mut hits: Vec<LexicalHit> = scores
            .into_iter()
            .map(|(chunk_id, score)| LexicalHit { chunk_id, score })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(limit);
        hits
    }
}
