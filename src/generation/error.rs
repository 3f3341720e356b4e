use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load generation model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("generation inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("invalid generator configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid generation parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("prompt is empty")]
    EmptyPrompt,
}

impl From<candle_core::Error> for GenerationError {
    fn from(err: candle_core::Error) -> Self {
        GenerationError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        GenerationError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
