//! Sentence embedder (BERT + mean pooling).
//!
//! Use [`SentenceEmbedderConfig::stub`] for tests and local runs without model files.

pub mod config;


pub use config::SentenceEmbedderConfig;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::TextEmbedder;
use crate::embedding::bert::SentenceBert;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_batch_tokenizer;
use crate::hashing::hash_to_u64;

enum EmbedderBackend {
    Model {
        model: SentenceBert,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Sentence embedder producing un-normalized mean-pooled vectors.
///
/// Vectors are not scaled to unit length, so dot products between them carry
/// magnitude as well as direction.
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: SentenceEmbedderConfig,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => {
                        format!("Model({})", device_label(device))
                    }
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: SentenceEmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        let device = select_device();
        debug!(device = device_label(&device), "Selected compute device for embedder");

        let tokenizer = load_batch_tokenizer(&config.model_dir, config.max_seq_len).map_err(
            |e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            },
        )?;

        let model = SentenceBert::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {e}"),
            }
        })?;

        if model.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "model hidden_size ({}) does not match embedding_dim ({})",
                    model.hidden_size(),
                    config.embedding_dim
                ),
            });
        }

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    /// Shorthand for `load(SentenceEmbedderConfig::stub())`.
    pub fn stub() -> Self {
        Self {
            backend: EmbedderBackend::Stub,
            config: SentenceEmbedderConfig::stub(),
        }
    }

    pub fn config(&self) -> &SentenceEmbedderConfig {
        &self.config
    }

    fn embed_batch_with_model(
        &self,
        texts: &[&str],
        model: &SentenceBert,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        let ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let masks = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        debug!(
            batch = texts.len(),
            seq_len = input_ids.dim(1)?,
            "Running sentence encoder"
        );

        let pooled = model.forward(&input_ids, &token_type_ids, &attention_mask)?;
        Ok(pooled.to_vec2::<f32>()?)
    }

    /// Hashed bag-of-words: each lowercase word adds 1.0 to a bucket picked by its hash.
    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let dim = self.config.embedding_dim;
        let mut embedding = vec![0f32; dim];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            let bucket = hash_to_u64(word.as_bytes()) as usize % dim;
            embedding[bucket] += 1.0;
        }

        embedding
    }
}

impl TextEmbedder for SentenceEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let vectors = match &self.backend {
            EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.embed_batch_with_model(texts, model, tokenizer, device)?,
            EmbedderBackend::Stub => texts.iter().map(|text| self.embed_stub(text)).collect(),
        };

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        Ok(vectors)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }
}
