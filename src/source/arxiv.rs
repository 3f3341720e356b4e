//! arXiv search API client.

use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument};

use super::PaperSource;
use super::error::SourceError;
use super::feed::parse_atom_feed;
use crate::config::DEFAULT_ARXIV_URL;
use crate::paper::Paper;

const USER_AGENT: &str = concat!("paperlens/", env!("CARGO_PKG_VERSION"));

/// Client for the arXiv `query` endpoint.
///
/// One `GET` per search; results come back in the API's own relevance order.
#[derive(Debug, Clone)]
pub struct ArxivClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
    /// Creates a client against `base_url` (e.g. [`DEFAULT_ARXIV_URL`]).
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::ClientBuildFailed {
                message: e.to_string(),
            })?;

        Ok(Self::with_client(http, base_url))
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query string pairs for a topic search (values are URL-encoded by the transport).
    pub fn query_pairs(topic: &str, max_results: usize) -> [(&'static str, String); 5] {
        [
            ("search_query", format!("all:{topic}")),
            ("start", "0".to_string()),
            ("max_results", max_results.to_string()),
            ("sortBy", "relevance".to_string()),
            ("sortOrder", "descending".to_string()),
        ]
    }
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_ARXIV_URL)
    }
}

impl PaperSource for ArxivClient {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn search(&self, topic: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&Self::query_pairs(topic, max_results))
            .header(ACCEPT, "application/atom+xml, application/xml;q=0.9, text/xml;q=0.8")
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed {
                url: self.base_url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                url: self.base_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::RequestFailed {
                url: self.base_url.clone(),
                message: e.to_string(),
            })?;

        debug!(bytes = body.len(), "Received feed");

        let papers = parse_atom_feed(&body)?;
        info!(entries = papers.len(), "Parsed search results");
        Ok(papers)
    }

    async fn is_ready(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "arxiv"
    }
}
