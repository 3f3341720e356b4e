use std::sync::Arc;

use tracing::{info, instrument};

use super::error::AnswerError;
use super::{build_prompt, select_citations, select_context};
use crate::constants::{CITATION_COUNT, RELEVANCE_THRESHOLD};
use crate::embedding::TextEmbedder;
use crate::generation::{GenerationParams, TextGenerator};
use crate::paper::{Answer, RankedSet};

/// Generates a cited answer to a question from a ranked paper set.
#[derive(Clone)]
pub struct AnswerEngine {
    embedder: Arc<dyn TextEmbedder>,
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    threshold: f32,
}

impl std::fmt::Debug for AnswerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerEngine")
            .field("params", &self.params)
            .field("threshold", &self.threshold)
            .field("stub_embedder", &self.embedder.is_stub())
            .field("stub_generator", &self.generator.is_stub())
            .finish()
    }
}

impl AnswerEngine {
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        generator: Arc<dyn TextGenerator>,
        params: GenerationParams,
    ) -> Self {
        Self {
            embedder,
            generator,
            params,
            threshold: RELEVANCE_THRESHOLD,
        }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Answers `question` from `ranked` and cites up to [`CITATION_COUNT`] of its papers.
    #[instrument(skip(self, ranked), fields(ranked = ranked.len()))]
    pub fn answer(&self, question: &str, ranked: &RankedSet) -> Result<Answer, AnswerError> {
        if question.trim().is_empty() {
            return Err(AnswerError::EmptyQuestion);
        }
        if ranked.is_empty() {
            return Err(AnswerError::NoPapers);
        }

        let context = select_context(self.embedder.as_ref(), question, ranked, self.threshold)?;
        let prompt = build_prompt(question, &context.blocks);
        let text = self.generator.generate(&prompt, &self.params)?;
        let citations = select_citations(self.embedder.as_ref(), &text, ranked, CITATION_COUNT)?;

        info!(
            context_papers = context.blocks.len(),
            answer_chars = text.chars().count(),
            citations = citations.len(),
            "Answer generated"
        );

        Ok(Answer::new(text, citations))
    }
}
