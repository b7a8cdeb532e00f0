//! Cosine similarity between embedding vectors.

use crate::error::{DalilError, Result};
use crate::util::simd;

/// Cosine similarity of two vectors, clamped to [-1, 1].
///
/// Returns an error on dimension mismatch. Either vector being zero yields
/// a similarity of 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(DalilError::validation(format!(
            "vector dimensions must match for cosine similarity ({} vs {})",
            a.len(),
            b.len()
        )));
    }

    let dot = simd::dot_f32(a, b);
    let norm_a = simd::dot_f32(a, a).sqrt();
    let norm_b = simd::dot_f32(b, b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}
