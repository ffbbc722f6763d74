//! Thresholded top-k similarity ranking.

use super::store::StoredDocument;
use super::types::SearchResult;
use std::cmp::Ordering;
use std::sync::Arc;

/// Computes cosine similarity between two vectors.
///
/// Returns values from -1.0 (opposite) to 1.0 (identical), with 0.0 indicating
/// orthogonal vectors. Returns 0.0 for mismatched lengths or zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Ranks `documents` against `query_embedding`.
///
/// Scores every document, drops those scoring below `threshold`, sorts the
/// rest by descending score and keeps the first `top_k`. `documents` must be in
/// insertion order: the sort is stable, so equal scores keep that order.
pub(crate) fn rank(
    query_embedding: &[f32],
    documents: &[Arc<StoredDocument>],
    top_k: usize,
    threshold: f32,
) -> Vec<SearchResult> {
    let mut scored: Vec<(f32, &Arc<StoredDocument>)> = documents
        .iter()
        .map(|doc| (cosine_similarity(query_embedding, &doc.embedding), doc))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(top_k)
        .map(|(score, doc)| SearchResult {
            document: doc.document.clone(),
            score,
        })
        .collect()
}
