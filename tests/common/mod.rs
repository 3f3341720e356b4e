//! Shared fixtures for integration tests: an in-process stand-in for the arXiv API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use parking_lot::RwLock;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One feed entry served by [`FakeArxiv`].
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub published: String,
}

impl FeedEntry {
    pub fn new(n: usize, title: &str, summary: &str) -> Self {
        Self {
            id: format!("http://arxiv.org/abs/2401.{n:05}v1"),
            title: title.to_string(),
            summary: summary.to_string(),
            published: format!("2024-01-{:02}T09:00:00Z", n % 28 + 1),
        }
    }
}

pub fn atom_feed(entries: &[FeedEntry]) -> String {
    let body: String = entries
        .iter()
        .map(|e| {
            format!(
                "<entry><id>{}</id><updated>{}</updated><published>{}</published>\
                 <title>{}</title><summary>{}</summary>\
                 <author><name>A. Author</name></author></entry>",
                e.id, e.published, e.published, e.title, e.summary
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>ArXiv Query</title>{body}</feed>"#
    )
}

#[derive(Clone, Default)]
struct FakeState {
    topics: Arc<RwLock<HashMap<String, Vec<FeedEntry>>>>,
    requests: Arc<AtomicUsize>,
    last_query: Arc<RwLock<Option<HashMap<String, String>>>>,
}

/// arXiv `query` endpoint serving canned entries per `all:{topic}` search.
///
/// Honors `max_results` the way the real API does.
pub struct FakeArxiv {
    addr: SocketAddr,
    state: FakeState,
    _handle: JoinHandle<()>,
}

async fn query_handler(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let topic = params
        .get("search_query")
        .and_then(|q| q.strip_prefix("all:"))
        .unwrap_or_default()
        .to_string();
    let max_results = params
        .get("max_results")
        .and_then(|m| m.parse::<usize>().ok())
        .unwrap_or(10);
    *state.last_query.write() = Some(params);

    let entries: Vec<FeedEntry> = state
        .topics
        .read()
        .get(&topic)
        .map(|entries| entries.iter().take(max_results).cloned().collect())
        .unwrap_or_default();

    ([("content-type", "application/atom+xml")], atom_feed(&entries))
}

impl FakeArxiv {
    pub async fn spawn() -> Self {
        let state = FakeState::default();
        let app = Router::new()
            .route("/api/query", get(query_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            _handle: handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/api/query", self.addr)
    }

    pub fn add_topic(&self, topic: &str, entries: Vec<FeedEntry>) {
        self.state.topics.write().insert(topic.to_string(), entries);
    }

    /// Adds `count` generic entries about `topic`.
    pub fn add_generated(&self, topic: &str, count: usize) {
        let entries = (0..count)
            .map(|n| {
                FeedEntry::new(
                    n,
                    &format!("{topic} paper {n}"),
                    &format!("This work studies {topic} with method {n}."),
                )
            })
            .collect();
        self.add_topic(topic, entries);
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.state.last_query.read().clone()
    }
}

impl Drop for FakeArxiv {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
