//! Embedding model boundary.
//!
//! [`TextEmbedder`] is what ranking depends on; [`SentenceEmbedder`] is the
//! production implementation (with a stub backend for model-free runs).

/// BERT sentence encoder with mean pooling.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
/// Sentence embedder and its config.
pub mod sentence;
/// Tokenizer/model loading helpers.
pub mod utils;

pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use sentence::{SentenceEmbedder, SentenceEmbedderConfig};

/// Maps texts to fixed-length vectors.
///
/// Implementations are synchronous and may be CPU heavy; async callers should
/// run them on a blocking thread.
pub trait TextEmbedder: Send + Sync {
    /// Embeds every text, returning one vector per input in input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embeds a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or(EmbeddingError::BatchSizeMismatch {
                expected: 1,
                actual: 0,
            })
    }

    fn embedding_dim(&self) -> usize;

    /// Returns `true` for model-free stand-ins.
    fn is_stub(&self) -> bool {
        false
    }
}
