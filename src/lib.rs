//! Paperlens library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by pipeline stage:
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`Paper`], [`RankedSet`], [`Answer`], [`Citation`] - Pipeline values
//! - [`SessionStore`], [`SessionContext`] - Per-user session state
//!
//! ## Retrieval
//! - [`PaperSource`], [`ArxivClient`] - Upstream paper search
//! - [`TextEmbedder`], [`SentenceEmbedder`] - Sentence embeddings
//! - [`RelevanceRanker`] - Dot-product top-k ranking
//!
//! ## Answering
//! - [`TextGenerator`], [`Seq2SeqGenerator`] - Seq2seq answer generation
//! - [`AnswerEngine`] - Context selection, prompting and citation
//!
//! ## Orchestration
//! - [`ResearchService`], [`ModelHub`] - Memoized fetch/rank and lazy model loading
//! - [`TtlCache`], [`CacheStatus`] - Time-boxed memoization
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod generation;
pub mod hashing;
pub mod paper;
pub mod ranking;
pub mod service;
pub mod session;
pub mod source;

pub use answer::{AnswerEngine, AnswerError, build_prompt, context_block};
pub use cache::{
    CacheKey, CacheStatus, PAPERLENS_CACHE_HEADER, PAPERLENS_STATUS_ERROR,
    PAPERLENS_STATUS_HEADER, PAPERLENS_STATUS_HEALTHY, PAPERLENS_STATUS_NOT_READY,
    PAPERLENS_STATUS_READY, TtlCache,
};
pub use config::{Config, ConfigError, DEFAULT_ARXIV_URL};
pub use constants::{
    CITATION_COUNT, DEFAULT_MAX_RESULTS, DimValidationError, EMBEDDING_DIM, FETCH_CAP,
    RELEVANCE_THRESHOLD, SNIPPET_CHARS, TOP_K_PAPERS, validate_embedding_dim,
};
pub use embedding::{EmbeddingError, SentenceEmbedder, SentenceEmbedderConfig, TextEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use generation::{
    GenerationError, GenerationParams, GeneratorConfig, Seq2SeqGenerator, TextGenerator,
};
#[cfg(any(test, feature = "mock"))]
pub use generation::MockGenerator;
pub use hashing::{hash_fetch_args, hash_rank_args, hash_to_u64};
pub use paper::{Answer, Citation, FetchedBatch, Paper, RankedSet, ScoredPaper};
pub use ranking::{RankingError, RelevanceRanker};
pub use service::{
    FetchOutcome, LoadedModels, ModelHub, ModelPaths, ResearchService, ServiceError,
    ServiceSettings,
};
pub use session::{
    ResolvedSession, SESSION_COOKIE, SessionContext, SessionId, SessionStore, SharedSession,
};
#[cfg(any(test, feature = "mock"))]
pub use source::MockPaperSource;
pub use source::{ArxivClient, PaperSource, SourceError};
