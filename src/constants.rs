//! Cross-cutting, shared constants.
//!
//! These are the fixed knobs of the retrieval and grounding pipeline. Runtime
//! configuration ([`crate::config::Config`]) only covers deployment concerns
//! (ports, model paths, cache sizing); the pipeline values below are not tunable.
//!
//! # Dimension Invariants
//!
//! The embedding dimension is treated as an invariant across the embedding, ranking
//! and answer modules. Use [`validate_embedding_dim`] at module boundaries to catch
//! a mismatched model early instead of producing meaningless dot products.

/// Upstream `max_results` requested from the preprint API when the caller does not say.
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Hard cap on papers kept from one fetch.
pub const FETCH_CAP: usize = 20;

/// Size of the ranked set shown to the user and used for answering.
pub const TOP_K_PAPERS: usize = 5;

/// Citations attached to a generated answer.
pub const CITATION_COUNT: usize = 2;

/// A paper's title+summary enters the prompt only when its score is strictly above this.
pub const RELEVANCE_THRESHOLD: f32 = 0.7;

/// Prompt tokens kept before generation (trailing tokens are dropped).
pub const PROMPT_MAX_TOKENS: usize = 512;

/// Upper bound on generated tokens.
pub const GENERATION_MAX_LENGTH: usize = 300;

pub const NUM_BEAMS: usize = 5;

pub const TEMPERATURE: f64 = 0.6;

pub const DO_SAMPLE: bool = true;

/// Time-to-live for memoized fetch and rank results.
pub const CACHE_TTL_SECS: u64 = 3600;

/// Characters of summary shown per paper card.
pub const SNIPPET_CHARS: usize = 200;

/// Output dimension of the paraphrase-MiniLM-L6-v2 sentence encoder.
pub const EMBEDDING_DIM: usize = 384;

/// The sentence encoder's own sequence limit.
pub const EMBEDDER_MAX_SEQ_LEN: usize = 128;

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use paperlens::constants::{validate_embedding_dim, EMBEDDING_DIM};
///
/// validate_embedding_dim(384, EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
