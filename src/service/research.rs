use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use super::error::ServiceError;
use super::models::ModelHub;
use crate::answer::AnswerEngine;
use crate::cache::{CacheStatus, TtlCache};
use crate::config::Config;
use crate::constants::{CACHE_TTL_SECS, DEFAULT_MAX_RESULTS, FETCH_CAP};
use crate::generation::GenerationParams;
use crate::hashing::{hash_fetch_args, hash_rank_args, hash_to_u64};
use crate::paper::{Answer, FetchedBatch, Paper, RankedSet};
use crate::ranking::{RankingError, RelevanceRanker};
use crate::source::PaperSource;

/// Cache sizing and decoding settings for a [`ResearchService`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
    pub generation: GenerationParams,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(CACHE_TTL_SECS),
            cache_capacity: 1024,
            generation: GenerationParams::default(),
        }
    }
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl: config.cache_ttl(),
            cache_capacity: config.cache_capacity,
            generation: GenerationParams::default().with_seed(config.generation_seed),
        }
    }
}

/// Result of a fetch-and-rank request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The source returned nothing; no ranking was attempted.
    NoPapers,
    Ranked {
        batch: FetchedBatch,
        ranked: RankedSet,
        /// Combined status of the fetch and rank caches.
        cache: CacheStatus,
    },
}

/// The research pipeline: fetch, rank, answer.
///
/// Fetch and rank results are memoized process-wide for the cache TTL; answers
/// are always recomputed.
pub struct ResearchService<S: PaperSource> {
    source: S,
    models: Arc<ModelHub>,
    fetch_cache: TtlCache<Vec<Paper>>,
    rank_cache: TtlCache<RankedSet>,
    generation: GenerationParams,
}

impl<S: PaperSource> std::fmt::Debug for ResearchService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchService")
            .field("source", &self.source.name())
            .field("models", &self.models)
            .field("fetch_cache", &self.fetch_cache)
            .field("rank_cache", &self.rank_cache)
            .finish()
    }
}

impl<S: PaperSource> ResearchService<S> {
    pub fn new(source: S, models: Arc<ModelHub>, settings: ServiceSettings) -> Self {
        Self {
            source,
            models,
            fetch_cache: TtlCache::new("fetch_papers", settings.cache_ttl, settings.cache_capacity),
            rank_cache: TtlCache::new("rank_papers", settings.cache_ttl, settings.cache_capacity),
            generation: settings.generation,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn models(&self) -> &Arc<ModelHub> {
        &self.models
    }

    pub fn fetch_cache(&self) -> &TtlCache<Vec<Paper>> {
        &self.fetch_cache
    }

    pub fn rank_cache(&self) -> &TtlCache<RankedSet> {
        &self.rank_cache
    }

    /// Fetches up to [`FETCH_CAP`] papers for `topic`, asking the source for `max_results`.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn fetch_papers(
        &self,
        topic: &str,
        max_results: usize,
    ) -> Result<(Vec<Paper>, CacheStatus), ServiceError> {
        if topic.trim().is_empty() {
            return Err(ServiceError::EmptyTopic);
        }

        let args = hash_fetch_args(topic, max_results);
        self.fetch_cache
            .get_or_try_insert_with(args, || async {
                let mut papers = self.source.search(topic, max_results).await?;
                papers.truncate(FETCH_CAP);
                info!(fetched = papers.len(), "Fetched papers");
                Ok::<_, ServiceError>(papers)
            })
            .await
            .map_err(ServiceError::from_shared)
    }

    /// Ranks `papers` against `query` with the process embedder.
    #[instrument(skip(self, papers), fields(papers = papers.len()))]
    pub async fn rank_papers(
        &self,
        query: &str,
        papers: &[Paper],
    ) -> Result<(RankedSet, CacheStatus), ServiceError> {
        if papers.is_empty() {
            return Err(RankingError::EmptyBatch.into());
        }

        let args = hash_rank_args(query, papers);
        self.rank_cache
            .get_or_try_insert_with(args, || async {
                let ranker = RelevanceRanker::new(Arc::clone(&self.models.models().await?.embedder));
                let query = query.to_string();
                let papers = papers.to_vec();
                let ranked =
                    tokio::task::spawn_blocking(move || ranker.rank(&query, &papers)).await??;
                Ok::<_, ServiceError>(ranked)
            })
            .await
            .map_err(ServiceError::from_shared)
    }

    /// Fetches papers for `topic` and ranks them against the topic itself.
    pub async fn fetch_and_rank(&self, topic: &str) -> Result<FetchOutcome, ServiceError> {
        let (papers, fetch_status) = self.fetch_papers(topic, DEFAULT_MAX_RESULTS).await?;
        if papers.is_empty() {
            info!(topic, "No papers found");
            return Ok(FetchOutcome::NoPapers);
        }

        let (ranked, rank_status) = self.rank_papers(topic, &papers).await?;
        info!(
            topic_hash = hash_to_u64(topic.as_bytes()),
            fetched = papers.len(),
            ranked = ranked.len(),
            cache = %fetch_status.combine(rank_status),
            "Fetch and rank complete"
        );

        Ok(FetchOutcome::Ranked {
            batch: FetchedBatch::new(topic, papers),
            ranked,
            cache: fetch_status.combine(rank_status),
        })
    }

    /// Answers `question` from `ranked`. Never cached.
    #[instrument(skip(self, ranked), fields(ranked = ranked.len()))]
    pub async fn answer(&self, question: &str, ranked: &RankedSet) -> Result<Answer, ServiceError> {
        let models = self.models.models().await?;
        let engine = AnswerEngine::new(
            Arc::clone(&models.embedder),
            Arc::clone(&models.generator),
            self.generation.clone(),
        );
        let question = question.to_string();
        let ranked = ranked.clone();

        let answer = tokio::task::spawn_blocking(move || engine.answer(&question, &ranked)).await??;
        Ok(answer)
    }

    /// `true` if the source can take requests.
    pub async fn is_ready(&self) -> bool {
        self.source.is_ready().await
    }
}
