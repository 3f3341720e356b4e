//! HTML rendering.
//!
//! One page template covers every response; handlers fill a [`PageView`] and the
//! template decides which sections to show. Templates are compiled into the binary
//! and auto-escaped.

use minijinja::Environment;
use serde::Serialize;

use paperlens::SNIPPET_CHARS;
use paperlens::paper::{Answer, Citation, RankedSet};

use super::error::GatewayError;

const PAGE_TEMPLATE: &str = "page.html";

pub const NO_PAPERS_MESSAGE: &str = "No papers found for the given topic.";
pub const FETCH_FIRST_MESSAGE: &str = "Please fetch papers first before asking a question.";
pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a research topic.";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaperCard {
    /// 1-based position in the ranked set.
    pub index: usize,
    pub title: String,
    pub published: String,
    pub snippet: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PapersView {
    /// Size of the fetched batch the cards were ranked from.
    pub fetched: usize,
    pub cards: Vec<PaperCard>,
}

impl PapersView {
    pub fn new(fetched: usize, ranked: &RankedSet) -> Self {
        let cards = ranked
            .iter()
            .enumerate()
            .map(|(i, paper)| PaperCard {
                index: i + 1,
                title: paper.title.clone(),
                published: paper.published.clone(),
                snippet: paper.snippet(SNIPPET_CHARS).to_string(),
                url: paper.url.clone(),
            })
            .collect();

        Self { fetched, cards }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl From<&Answer> for AnswerView {
    fn from(answer: &Answer) -> Self {
        Self {
            text: answer.text.clone(),
            citations: answer.citations().to_vec(),
        }
    }
}

/// Everything the page template can show.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageView {
    pub topic: String,
    pub question: String,
    pub notice: Option<Notice>,
    pub papers: Option<PapersView>,
    pub answer: Option<AnswerView>,
}

#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE, include_str!("../../templates/page.html"))?;
        Ok(Self { env })
    }

    pub fn page(&self, view: &PageView) -> Result<String, GatewayError> {
        let template = self
            .env
            .get_template(PAGE_TEMPLATE)
            .map_err(|e| GatewayError::RenderFailed(e.to_string()))?;
        template
            .render(view)
            .map_err(|e| GatewayError::RenderFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens::paper::{Paper, ScoredPaper};

    fn ranked(papers: Vec<Paper>) -> RankedSet {
        RankedSet::new(
            papers
                .into_iter()
                .map(|paper| ScoredPaper { paper, score: 1.0 })
                .collect(),
        )
    }

    #[test]
    fn test_empty_page_has_both_forms() {
        let html = Renderer::new().unwrap().page(&PageView::default()).unwrap();
        assert!(html.contains(r#"action="/fetch""#));
        assert!(html.contains(r#"action="/ask""#));
        assert!(!html.contains("Top Relevant Papers"));
        assert!(!html.contains("References:"));
    }

    #[test]
    fn test_cards_are_numbered_and_truncated() {
        let long = "x".repeat(250);
        let set = ranked(vec![
            Paper::new("First", long.clone(), "http://arxiv.org/abs/1", "2024-01-01"),
            Paper::new("Second", "short", "http://arxiv.org/abs/2", "2024-01-02"),
        ]);
        let view = PageView {
            papers: Some(PapersView::new(17, &set)),
            ..Default::default()
        };

        let html = Renderer::new().unwrap().page(&view).unwrap();
        assert!(html.contains("Top Relevant Papers (out of 17 fetched)"));
        assert!(html.contains("1. First"));
        assert!(html.contains("2. Second"));
        assert!(html.contains(&format!("<p>{}...</p>", "x".repeat(200))));
        assert!(!html.contains(&"x".repeat(201)));
        assert_eq!(html.matches(">Read more</a>").count(), 2);
    }

    #[test]
    fn test_markup_is_escaped() {
        let set = ranked(vec![Paper::new(
            "<script>alert(1)</script>",
            "a < b",
            "http://arxiv.org/abs/1",
            "2024",
        )]);
        let view = PageView {
            topic: "\"><b>".to_string(),
            papers: Some(PapersView::new(1, &set)),
            ..Default::default()
        };

        let html = Renderer::new().unwrap().page(&view).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("\"><b>"));
    }

    #[test]
    fn test_answer_section_lists_references_in_order() {
        let answer = Answer::new(
            "Attention relates all positions.",
            vec![
                Citation {
                    title: "A".to_string(),
                    url: "http://a".to_string(),
                },
                Citation {
                    title: "B".to_string(),
                    url: "http://b".to_string(),
                },
            ],
        );
        let view = PageView {
            answer: Some(AnswerView::from(&answer)),
            ..Default::default()
        };

        let html = Renderer::new().unwrap().page(&view).unwrap();
        assert!(html.contains("Answer:"));
        assert!(html.contains("Attention relates all positions."));
        let a = html.find(">A</a>").unwrap();
        let b = html.find(">B</a>").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_notices() {
        let renderer = Renderer::new().unwrap();
        let html = renderer
            .page(&PageView {
                notice: Some(Notice::error(NO_PAPERS_MESSAGE)),
                ..Default::default()
            })
            .unwrap();
        assert!(html.contains(r#"class="notice-error""#));
        assert!(html.contains(NO_PAPERS_MESSAGE));

        let html = renderer
            .page(&PageView {
                notice: Some(Notice::warning(FETCH_FIRST_MESSAGE)),
                ..Default::default()
            })
            .unwrap();
        assert!(html.contains(r#"class="notice-warning""#));
        assert!(html.contains(FETCH_FIRST_MESSAGE));
    }
}
