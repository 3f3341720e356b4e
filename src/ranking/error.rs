use thiserror::Error;

use crate::constants::DimValidationError;
use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedder output rejected: {0}")]
    EmbedderDimension(#[from] DimValidationError),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("cannot rank an empty paper batch")]
    EmptyBatch,
}
