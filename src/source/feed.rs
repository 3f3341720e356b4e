//! Atom feed parsing.
//!
//! The search endpoint answers with an Atom document whose `entry` elements carry
//! `title`, `summary`, `id` and `published`. Other elements (authors, links,
//! categories, `arxiv:` extensions) are ignored.

use serde::Deserialize;

use super::error::SourceError;
use crate::paper::Paper;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    published: Option<String>,
}

impl AtomEntry {
    fn into_paper(self, position: usize) -> Result<Paper, SourceError> {
        let title = collapse_whitespace(&required(self.title, "title", position)?);
        let summary = required(self.summary, "summary", position)?;
        let url = required(self.id, "id", position)?;
        let published = required(self.published, "published", position)?;

        Ok(Paper {
            title,
            summary,
            url,
            published,
        })
    }
}

fn required(value: Option<String>, field: &str, position: usize) -> Result<String, SourceError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SourceError::MalformedFeed {
            message: format!("entry {position} has no {field}"),
        })
}

/// Long titles are hard-wrapped upstream; fold the wraps back into single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses an Atom document into papers, preserving entry order.
///
/// An entry lacking any of the four required fields fails the whole feed.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<Paper>, SourceError> {
    let feed: AtomFeed =
        quick_xml::de::from_str(xml).map_err(|e| SourceError::MalformedFeed {
            message: e.to_string(),
        })?;

    feed.entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| entry.into_paper(position))
        .collect()
}
