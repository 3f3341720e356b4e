use std::sync::Arc;

use thiserror::Error;

use crate::answer::AnswerError;
use crate::embedding::EmbeddingError;
use crate::generation::GenerationError;
use crate::ranking::RankingError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("topic is empty")]
    EmptyTopic,

    #[error("paper source error: {0}")]
    Source(#[from] SourceError),

    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("answer error: {0}")]
    Answer(#[from] AnswerError),

    #[error("embedder unavailable: {0}")]
    EmbedderLoad(#[from] EmbeddingError),

    #[error("generator unavailable: {0}")]
    GeneratorLoad(#[from] GenerationError),

    #[error("background task failed: {reason}")]
    TaskFailed { reason: String },

    /// A failure from a computation another request started and this one waited on.
    #[error("{0}")]
    Shared(Arc<ServiceError>),
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::TaskFailed {
            reason: err.to_string(),
        }
    }
}

impl ServiceError {
    /// Recovers the owned error from a cache computation, wrapping it when other
    /// callers still hold it.
    pub fn from_shared(err: Arc<ServiceError>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(ServiceError::Shared)
    }

    /// The underlying error, looking through [`ServiceError::Shared`].
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// `true` for faults caused by the caller's input rather than a backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.root(),
            ServiceError::EmptyTopic | ServiceError::Answer(AnswerError::EmptyQuestion)
        )
    }
}
