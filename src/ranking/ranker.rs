use std::sync::Arc;

use tracing::{debug, instrument};

use super::error::RankingError;
use super::{score_all, top_k_stable};
use crate::constants::{TOP_K_PAPERS, validate_embedding_dim};
use crate::embedding::TextEmbedder;
use crate::paper::{Paper, RankedSet, ScoredPaper};

/// Orders fetched papers by how closely their summaries match a query.
#[derive(Clone)]
pub struct RelevanceRanker {
    embedder: Arc<dyn TextEmbedder>,
}

impl std::fmt::Debug for RelevanceRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceRanker")
            .field("embedding_dim", &self.embedder.embedding_dim())
            .field("stub", &self.embedder.is_stub())
            .finish()
    }
}

impl RelevanceRanker {
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self { embedder }
    }

    pub fn embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.embedder
    }

    /// Ranks `papers` against `query` and keeps the best [`TOP_K_PAPERS`].
    ///
    /// The query is embedded once and all summaries in a single batch. Ties keep
    /// fetch order.
    #[instrument(skip(self, papers), fields(papers = papers.len()))]
    pub fn rank(&self, query: &str, papers: &[Paper]) -> Result<RankedSet, RankingError> {
        if papers.is_empty() {
            return Err(RankingError::EmptyBatch);
        }

        let query_vector = self.embedder.embed(query)?;
        validate_embedding_dim(query_vector.len(), self.embedder.embedding_dim())?;

        let summaries: Vec<&str> = papers.iter().map(|p| p.summary.as_str()).collect();
        let summary_vectors = self.embedder.embed_batch(&summaries)?;
        let scores = score_all(&query_vector, &summary_vectors)?;

        let top = top_k_stable(&scores, TOP_K_PAPERS);
        debug!(
            best = top.first().map(|&i| scores[i]),
            kept = top.len(),
            "Ranked papers"
        );

        Ok(RankedSet::new(
            top.into_iter()
                .map(|i| ScoredPaper {
                    paper: papers[i].clone(),
                    score: scores[i],
                })
                .collect(),
        ))
    }
}
