//! Question answering over a ranked paper set.
//!
//! Three steps, in order:
//!
//! 1. [`select_context`] keeps papers whose question similarity is strictly above
//!    the relevance threshold.
//! 2. [`build_prompt`] frames the question and the kept papers for the generator.
//! 3. [`select_citations`] re-scores the whole ranked set against the generated
//!    answer and keeps the closest papers.

pub mod engine;
pub mod error;
pub mod prompt;


pub use engine::AnswerEngine;
pub use error::AnswerError;
pub use prompt::{build_prompt, context_block};

use tracing::debug;

use crate::embedding::TextEmbedder;
use crate::paper::{Citation, RankedSet};
use crate::ranking::{score_all, top_k_stable};

/// Context blocks chosen for a question, with the score of every ranked paper.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSelection {
    pub blocks: Vec<String>,
    /// One score per ranked paper, in ranked order.
    pub scores: Vec<f32>,
}

impl ContextSelection {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Scores `question` against each paper's title and summary; keeps those strictly above `threshold`.
pub fn select_context(
    embedder: &dyn TextEmbedder,
    question: &str,
    ranked: &RankedSet,
    threshold: f32,
) -> Result<ContextSelection, AnswerError> {
    if ranked.is_empty() {
        return Ok(ContextSelection {
            blocks: Vec::new(),
            scores: Vec::new(),
        });
    }

    let question_vector = embedder.embed(question)?;
    let texts: Vec<String> = ranked.iter().map(|p| p.title_and_summary()).collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let scores = score_all(&question_vector, &embedder.embed_batch(&text_refs)?)?;

    let blocks: Vec<String> = ranked
        .iter()
        .zip(&scores)
        .filter(|(_, score)| **score > threshold)
        .map(|(paper, _)| context_block(paper))
        .collect();

    debug!(
        selected = blocks.len(),
        candidates = scores.len(),
        threshold,
        "Selected prompt context"
    );

    Ok(ContextSelection { blocks, scores })
}

/// Picks the `k` ranked papers whose summaries are closest to `answer`.
pub fn select_citations(
    embedder: &dyn TextEmbedder,
    answer: &str,
    ranked: &RankedSet,
    k: usize,
) -> Result<Vec<Citation>, AnswerError> {
    if ranked.is_empty() || k == 0 {
        return Ok(Vec::new());
    }

    let answer_vector = embedder.embed(answer)?;
    let summaries: Vec<&str> = ranked.iter().map(|p| p.summary.as_str()).collect();
    let scores = score_all(&answer_vector, &embedder.embed_batch(&summaries)?)?;

    let papers = ranked.papers();
    Ok(top_k_stable(&scores, k)
        .into_iter()
        .map(|i| papers[i].paper.citation())
        .collect())
}
