use std::path::PathBuf;

use crate::constants::{
    DO_SAMPLE, GENERATION_MAX_LENGTH, NUM_BEAMS, PROMPT_MAX_TOKENS, TEMPERATURE,
};
use crate::embedding::utils::missing_model_file;
use crate::generation::error::GenerationError;

/// Files a seq2seq model directory must contain.
pub const REQUIRED_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

/// Decoding parameters for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Prompt tokens kept; longer prompts lose their trailing tokens.
    pub max_input_tokens: usize,
    /// Upper bound on generated tokens.
    pub max_length: usize,
    pub num_beams: usize,
    pub temperature: f64,
    /// Sample beam candidates instead of taking the best scoring ones.
    pub do_sample: bool,
    /// Fixed RNG seed; `None` draws fresh entropy per call.
    pub seed: Option<u64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_input_tokens: PROMPT_MAX_TOKENS,
            max_length: GENERATION_MAX_LENGTH,
            num_beams: NUM_BEAMS,
            temperature: TEMPERATURE,
            do_sample: DO_SAMPLE,
            seed: None,
        }
    }
}

impl GenerationParams {
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        let reason = if self.max_input_tokens < 2 {
            "max_input_tokens must be at least 2"
        } else if self.max_length == 0 {
            "max_length must be non-zero"
        } else if self.num_beams == 0 {
            "num_beams must be non-zero"
        } else if !(self.temperature.is_finite() && self.temperature > 0.0) {
            "temperature must be a positive number"
        } else {
            return Ok(());
        };

        Err(GenerationError::InvalidParams {
            reason: reason.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
/// Configuration for [`Seq2SeqGenerator`](super::Seq2SeqGenerator).
pub struct GeneratorConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// If true, run the extractive stub (no model files required).
    pub testing_stub: bool,
}

impl GeneratorConfig {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            testing_stub: false,
        }
    }

    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(GenerationError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        match missing_model_file(&self.model_dir, &REQUIRED_FILES) {
            Some(path) => Err(GenerationError::ModelNotFound { path }),
            None => Ok(()),
        }
    }
}
