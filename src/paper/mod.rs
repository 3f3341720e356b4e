//! Paper records and the values derived from them.
//!
//! Everything here is immutable once built: a new fetch replaces a [`RankedSet`]
//! wholesale rather than editing it.


use serde::{Deserialize, Serialize};

use crate::constants::{CITATION_COUNT, TOP_K_PAPERS};

/// One preprint as returned by the upstream search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub summary: String,
    /// Abstract page URL (the Atom entry `id`).
    pub url: String,
    /// Timestamp exactly as the API returned it.
    pub published: String,
}

impl Paper {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        url: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            url: url.into(),
            published: published.into(),
        }
    }

    /// First `max_chars` characters of the summary (character-, not byte-based).
    pub fn snippet(&self, max_chars: usize) -> &str {
        match self.summary.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.summary[..idx],
            None => &self.summary,
        }
    }

    /// Text scored against a question during context selection.
    pub fn title_and_summary(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    pub fn citation(&self) -> Citation {
        Citation {
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }
}

/// The papers from one fetch, in upstream relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedBatch {
    pub topic: String,
    pub papers: Vec<Paper>,
}

impl FetchedBatch {
    pub fn new(topic: impl Into<String>, papers: Vec<Paper>) -> Self {
        Self {
            topic: topic.into(),
            papers,
        }
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// A paper with its similarity score against the ranking query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPaper {
    pub paper: Paper,
    /// Un-normalized dot product; only meaningful relative to its siblings.
    pub score: f32,
}

/// Up to [`TOP_K_PAPERS`] papers in descending score order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedSet {
    papers: Vec<ScoredPaper>,
}

impl RankedSet {
    /// Builds a ranked set, keeping at most [`TOP_K_PAPERS`] entries.
    ///
    /// The caller supplies entries already ordered by descending score.
    pub fn new(mut papers: Vec<ScoredPaper>) -> Self {
        papers.truncate(TOP_K_PAPERS);
        Self { papers }
    }

    pub fn papers(&self) -> &[ScoredPaper] {
        &self.papers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Paper> {
        self.papers.iter().map(|s| &s.paper)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn contains(&self, citation: &Citation) -> bool {
        self.iter()
            .any(|p| p.title == citation.title && p.url == citation.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

/// Generated answer text with the papers it most resembles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    citations: Vec<Citation>,
}

impl Answer {
    /// Builds an answer, keeping at most [`CITATION_COUNT`] citations.
    pub fn new(text: impl Into<String>, mut citations: Vec<Citation>) -> Self {
        citations.truncate(CITATION_COUNT);
        Self {
            text: text.into(),
            citations,
        }
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }
}
