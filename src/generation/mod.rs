//! Generation model boundary.
//!
//! [`TextGenerator`] is what the answer engine depends on. [`Seq2SeqGenerator`]
//! runs a T5 checkpoint through [`beam::beam_search`], or an extractive stub when
//! no model files are configured.

pub mod beam;
pub mod config;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod seq2seq;


pub use config::{GenerationParams, GeneratorConfig};
pub use error::GenerationError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerator;
pub use seq2seq::Seq2SeqGenerator;

/// Produces free text from a prompt.
///
/// Implementations are synchronous; async callers should run them on a blocking
/// thread.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError>;

    /// Returns `true` for model-free stand-ins.
    fn is_stub(&self) -> bool {
        false
    }
}
