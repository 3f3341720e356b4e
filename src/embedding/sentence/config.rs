use std::path::PathBuf;

use crate::constants::{EMBEDDER_MAX_SEQ_LEN, EMBEDDING_DIM};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::missing_model_file;

/// Files a sentence-encoder directory must contain.
pub const REQUIRED_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEmbedder`](super::SentenceEmbedder).
pub struct SentenceEmbedderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Max tokens per input; longer texts are truncated.
    pub max_seq_len: usize,
    /// Expected output dimension.
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for SentenceEmbedderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            max_seq_len: EMBEDDER_MAX_SEQ_LEN,
            embedding_dim: EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl SentenceEmbedderConfig {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Stub config: hashed bag-of-words vectors, no model files.
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 || self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim and max_seq_len must be non-zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if let Some(path) = missing_model_file(&self.model_dir, &REQUIRED_FILES) {
            return Err(EmbeddingError::ModelNotFound { path });
        }

        Ok(())
    }

    /// Returns `true` if every required model file is present.
    pub fn model_available(&self) -> bool {
        !self.model_dir.as_os_str().is_empty()
            && missing_model_file(&self.model_dir, &REQUIRED_FILES).is_none()
    }
}
