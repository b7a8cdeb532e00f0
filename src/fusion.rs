//! Score fusion across the lexical and vector candidate lists.
//!
//! BM25 scores are unbounded while cosine similarities live in [-1, 1];
//! adding them raw would let one modality dominate. Each modality's score
//! list is therefore rescaled to [0, 1] by a pure normalization function
//! over the full per-query list before the weighted combination. A chunk
//! present in only one list receives 0.0 for the other modality's
//! normalized score rather than being excluded.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::lexical::LexicalHit;
use crate::vector::VectorHit;

/// Strategy for rescaling a modality's score list to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreNormalization {
    /// Min-max rescaling. A degenerate list (all scores equal, or empty)
    /// normalizes to all zeros.
    #[default]
    MinMax,
    /// Rank-based rescaling: the best score maps to 1, the worst to 0,
    /// equal scores map to equal values.
    Rank,
}

/// Rescale a score list to [0, 1].
///
/// Pure function over the full list; the i-th output corresponds to the
/// i-th input.
pub fn normalize_scores(scores: &[f32], strategy: ScoreNormalization) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    match strategy {
        ScoreNormalization::MinMax => {
            let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
            let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let range = max - min;
            if range < 1e-9 {
                return vec![0.0; scores.len()];
            }
            scores.iter().map(|s| (s - min) / range).collect()
        }
        ScoreNormalization::Rank => {
            if scores.len() == 1 {
                return vec![1.0];
            }
            let mut sorted = scores.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let denom = (scores.len() - 1) as f32;
            scores
                .iter()
                .map(|s| {
                    // Number of scores strictly below `s`.
                    let below = sorted.partition_point(|x| x < s);
                    below as f32 / denom
                })
                .collect()
        }
    }
}

/// A candidate after fusion, carrying both raw and normalized scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusedCandidate {
    /// Chunk id.
    pub chunk_id: u64,
    /// Raw BM25 score (0.0 when absent from the lexical list).
    pub bm25_score: f32,
    /// Raw cosine similarity (0.0 when absent from the vector list).
    pub vector_score: f32,
    /// BM25 score rescaled to [0, 1].
    pub bm25_norm: f32,
    /// Vector score rescaled to [0, 1].
    pub vector_norm: f32,
    /// `alpha * vector_norm + (1 - alpha) * bm25_norm`.
    pub fused_score: f32,
}

/// Merges the two candidate lists into one deterministic ranking.
#[derive(Debug, Clone, Copy)]
pub struct FusionRanker {
    alpha: f32,
    normalization: ScoreNormalization,
}

impl FusionRanker {
    /// Create a ranker with the given vector weight and strategy.
    pub fn new(alpha: f32, normalization: ScoreNormalization) -> Self {
        Self {
            alpha,
            normalization,
        }
    }

    /// Fuse the candidate lists.
    ///
    /// Output covers the union of both lists, sorted descending by fused
    /// score with ties broken by chunk id ascending. Truncation to the
    /// requested result count is deliberately not done here; the access
    /// filter must see the full pool first.
    pub fn fuse(&self, lexical: &[LexicalHit], vector: &[VectorHit]) -> Vec<FusedCandidate> {
        let bm25_norms = normalize_scores(
            &lexical.iter().map(|h| h.score).collect::<Vec<_>>(),
            self.normalization,
        );
        let vector_norms = normalize_scores(
            &vector.iter().map(|h| h.similarity).collect::<Vec<_>>(),
            self.normalization,
        );

        let mut by_id: AHashMap<u64, FusedCandidate> = AHashMap::new();

        for (hit, norm) in lexical.iter().zip(bm25_norms) {
            by_id.insert(
                hit.chunk_id,
                FusedCandidate {
                    chunk_id: hit.chunk_id,
                    bm25_score: hit.score,
                    vector_score: 0.0,
                    bm25_norm: norm,
                    vector_norm: 0.0,
                    fused_score: 0.0,
                },
            );
        }

        for (hit, norm) in vector.iter().zip(vector_norms) {
            let entry = by_id.entry(hit.chunk_id).or_insert(FusedCandidate {
                chunk_id: hit.chunk_id,
                bm25_score: 0.0,
                vector_score: 0.0,
                bm25_norm: 0.0,
                vector_norm: 0.0,
                fused_score: 0.0,
            });
            entry.vector_score = hit.similarity;
            entry.vector_norm = norm;
        }

        let mut candidates: Vec<FusedCandidate> = by_id.into_values().collect();
        for candidate in &mut candidates {
            candidate.fused_score =
                self.alpha * candidate.vector_norm + (1.0 - self.alpha) * candidate.bm25_norm;
        }

        candidates.sort_by(|a, b| {
            b.fused_score
                .partial_cmp(&a.fused_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        candidates
    }
}
