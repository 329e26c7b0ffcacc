//! Offline answer-quality metrics.

use std::collections::HashSet;

use super::distance::cosine_similarity;

/// Highest cosine similarity between the answer and any context vector.
/// Zero when there is no context.
pub fn evaluate_groundedness(answer_embedding: &[f32], context_embeddings: &[Vec<f32>]) -> f32 {
    context_embeddings
        .iter()
        .map(|context| cosine_similarity(answer_embedding, context))
        .fold(None, |best: Option<f32>, score| {
            Some(best.map_or(score, |b| b.max(score)))
        })
        .unwrap_or(0.0)
}

/// Share of the expected segment ids that were retrieved.
pub fn evaluate_relevance(retrieved_ids: &[usize], expected_ids: &[usize]) -> f32 {
    let retrieved: HashSet<usize> = retrieved_ids.iter().copied().collect();
    let expected: HashSet<usize> = expected_ids.iter().copied().collect();
    let hits = retrieved.intersection(&expected).count();
    hits as f32 / expected.len().max(1) as f32
}
