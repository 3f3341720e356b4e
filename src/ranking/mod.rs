//! Relevance ranking by embedding dot product.
//!
//! Scores are plain dot products of un-normalized vectors. They order papers
//! against one query but carry no absolute meaning.

pub mod error;
pub mod ranker;


use std::cmp::Ordering;

pub use error::RankingError;
pub use ranker::RelevanceRanker;

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32, RankingError> {
    if a.len() != b.len() {
        return Err(RankingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Scores every vector in `vectors` against `query`.
pub fn score_all(query: &[f32], vectors: &[Vec<f32>]) -> Result<Vec<f32>, RankingError> {
    vectors.iter().map(|v| dot(query, v)).collect()
}

/// Descending order with NaN after every number.
fn descending_nan_last(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Indices of the `k` highest scores, best first.
///
/// Equal scores keep their input order.
pub fn top_k_stable(scores: &[f32], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&i, &j| descending_nan_last(scores[i], scores[j]));
    indices.truncate(k);
    indices
}
