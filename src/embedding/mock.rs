use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::{EmbeddingError, TextEmbedder};

#[derive(Debug, Default, Clone)]
/// Embedder with hand-picked vectors per exact input text.
///
/// Unregistered texts map to the zero vector. Batch calls are counted so tests can
/// check that a ranking embeds its inputs in one pass.
pub struct MockEmbedder {
    dim: usize,
    vectors: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    batch_calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            ..Default::default()
        }
    }

    /// Registers the vector returned for `text` (padded or cut to the mock's dimension).
    pub fn with_vector(self, text: impl Into<String>, mut vector: Vec<f32>) -> Self {
        vector.resize(self.dim, 0.0);
        self.vectors.write().insert(text.into(), vector);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

impl TextEmbedder for MockEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock embedder set to fail".to_string(),
            });
        }

        let vectors = self.vectors.read();
        Ok(texts
            .iter()
            .map(|text| {
                vectors
                    .get(*text)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0; self.dim])
            })
            .collect())
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn is_stub(&self) -> bool {
        true
    }
}
