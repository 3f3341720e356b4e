//! Paper sources: where fetched papers come from.
//!
//! - [`ArxivClient`] talks to the public preprint search API.
//! - [`MockPaperSource`] serves canned results (tests / `mock` feature).

pub mod arxiv;
pub mod error;
pub mod feed;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


use std::future::Future;

pub use arxiv::ArxivClient;
pub use error::SourceError;
pub use feed::parse_atom_feed;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockPaperSource;

use crate::paper::Paper;

/// Backend that turns a topic into papers, in the backend's own relevance order.
pub trait PaperSource: Send + Sync {
    /// Searches for up to `max_results` papers about `topic`.
    fn search(
        &self,
        topic: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<Paper>, SourceError>> + Send;

    /// Returns `true` if the source can take requests.
    fn is_ready(&self) -> impl Future<Output = bool> + Send;

    /// Short identifier used in logs and readiness output.
    fn name(&self) -> &'static str;
}
