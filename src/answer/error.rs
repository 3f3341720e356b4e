use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use crate::ranking::RankingError;

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("no ranked papers to answer from")]
    NoPapers,

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("scoring error: {0}")]
    Scoring(#[from] RankingError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
}
