//! Top-k nearest-chunk lookup over the in-memory index.

use crate::domain::entities::{DocumentChunk, DocumentIndex};

pub const DEFAULT_TOP_K: usize = 3;

/// Cosine similarity; zero-norm or mismatched vectors score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Returns the `min(k, |index|)` chunks nearest to `query_vector`,
/// nearest first.
pub fn search<'a>(
    index: &'a DocumentIndex,
    query_vector: &[f32],
    k: usize,
) -> Vec<&'a DocumentChunk> {
    let mut scored: Vec<(usize, f32)> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(i, v)| (i, cosine_similarity(query_vector, v)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    scored.into_iter().map(|(i, _)| &index.chunks()[i]).collect()
}
