use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{GenerationError, GenerationParams, TextGenerator};

#[derive(Debug, Clone)]
/// Generator returning a fixed reply and recording every prompt it receives.
pub struct MockGenerator {
    reply: Arc<Mutex<String>>,
    prompts: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl MockGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *self.reply.lock() = reply.into();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Prompts seen so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GenerationError> {
        params.validate()?;
        self.prompts.lock().push(prompt.to_string());

        if self.failing.load(Ordering::SeqCst) {
            return Err(GenerationError::InferenceFailed {
                reason: "mock generator set to fail".to_string(),
            });
        }

        Ok(self.reply.lock().clone())
    }

    fn is_stub(&self) -> bool {
        true
    }
}
