//! SIMD kernels for scoring hot paths, built on the `wide` crate.

use wide::f32x8;

/// Dot product of two equal-length slices using f32x8 lanes.
///
/// Callers are responsible for checking that `a.len() == b.len()`.
pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut acc = f32x8::splat(0.0);
    let mut chunks_a = a.chunks_exact(8);
    let mut chunks_b = b.chunks_exact(8);

    for (ca, cb) in chunks_a.by_ref().zip(chunks_b.by_ref()) {
        let va = f32x8::new([ca[0], ca[1], ca[2], ca[3], ca[4], ca[5], ca[6], ca[7]]);
        let vb = f32x8::new([cb[0], cb[1], cb[2], cb[3], cb[4], cb[5], cb[6], cb[7]]);
        acc += va * vb;
    }

    let mut sum: f32 = acc.to_array().iter().sum();
    for (x, y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum += x * y;
    }
    sum
}

/// Batched BM25 term-frequency component.
///
/// Computes `tf * (k1 + 1) / (tf + k1 * (1 - b + b * len / avg_len))` for
/// each (term frequency, chunk length) pair, eight lanes at a time.
pub fn bm25_tf_batch(term_freqs: &[f32], doc_lens: &[f32], avg_doc_len: f32, k1: f32, b: f32) -> Vec<f32> {
    debug_assert_eq!(term_freqs.len(), doc_lens.len());

    let mut results = Vec::with_capacity(term_freqs.len());
    let k1_vec = f32x8::splat(k1);
    let b_vec = f32x8::splat(b);
    let avg_vec = f32x8::splat(avg_doc_len);
    let one_vec = f32x8::splat(1.0);

    let mut tf_chunks = term_freqs.chunks_exact(8);
    let mut len_chunks = doc_lens.chunks_exact(8);

    for (tf, dl) in tf_chunks.by_ref().zip(len_chunks.by_ref()) {
        let tf_vec = f32x8::new([tf[0], tf[1], tf[2], tf[3], tf[4], tf[5], tf[6], tf[7]]);
        let dl_vec = f32x8::new([dl[0], dl[1], dl[2], dl[3], dl[4], dl[5], dl[6], dl[7]]);

        let numerator = tf_vec * (k1_vec + one_vec);
        let length_norm = one_vec - b_vec + b_vec * dl_vec / avg_vec;
        let denominator = tf_vec + k1_vec * length_norm;

        results.extend_from_slice(&(numerator / denominator).to_array());
    }

    for (tf, dl) in tf_chunks.remainder().iter().zip(len_chunks.remainder()) {
        let length_norm = 1.0 - b + b * dl / avg_doc_len;
        results.push(tf * (k1 + 1.0) / (tf + k1 * length_norm));
    }

    results
}
