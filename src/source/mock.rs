use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use super::PaperSource;
use super::error::SourceError;
use crate::paper::Paper;

#[derive(Default, Clone)]
/// In-memory paper source with canned results per topic.
///
/// Unknown topics return an empty result. Every call is counted, so tests can tell a
/// cache hit from a second upstream request.
pub struct MockPaperSource {
    topics: Arc<RwLock<HashMap<String, Vec<Paper>>>>,
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
}

impl MockPaperSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the papers returned for `topic`.
    pub fn with_topic(self, topic: impl Into<String>, papers: Vec<Paper>) -> Self {
        self.topics.write().insert(topic.into(), papers);
        self
    }

    /// Makes every subsequent search fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delays every search by `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.latency_ms.store(latency.as_millis() as u64, Ordering::SeqCst);
        self
    }

    /// Number of `search` calls seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generates `count` distinct papers about `subject`.
    pub fn sample_papers(subject: &str, count: usize) -> Vec<Paper> {
        (0..count)
            .map(|n| {
                Paper::new(
                    format!("{subject} study {n}"),
                    format!("We investigate {subject} from angle number {n}."),
                    format!("http://arxiv.org/abs/2401.{n:05}v1"),
                    format!("2024-01-{:02}T00:00:00Z", n % 28 + 1),
                )
            })
            .collect()
    }
}

impl PaperSource for MockPaperSource {
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable {
                message: "mock source set to fail".to_string(),
            });
        }

        let papers = self
            .topics
            .read()
            .get(topic)
            .map(|papers| papers.iter().take(max_results).cloned().collect())
            .unwrap_or_default();

        Ok(papers)
    }

    async fn is_ready(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
