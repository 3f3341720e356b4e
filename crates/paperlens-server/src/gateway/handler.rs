//! Page handlers for the two user actions.
//!
//! Every handler resolves the caller's session from the `paperlens_session`
//! cookie first, then renders the full page. A request without a valid cookie
//! gets a fresh session and a `Set-Cookie` header on the response.

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use paperlens::answer::AnswerError;
use paperlens::cache::{CacheStatus, PAPERLENS_CACHE_HEADER};
use paperlens::service::{FetchOutcome, ServiceError};
use paperlens::session::{ResolvedSession, SESSION_COOKIE};
use paperlens::source::PaperSource;

use crate::gateway::error::GatewayError;
use crate::gateway::render::{
    AnswerView, EMPTY_QUESTION_MESSAGE, EMPTY_TOPIC_MESSAGE, FETCH_FIRST_MESSAGE,
    NO_PAPERS_MESSAGE, Notice, PageView, PapersView,
};
use crate::gateway::state::HandlerState;

/// Body of `POST /fetch`.
///
/// A missing `topic` field deserializes to an empty string, which the
/// handler reports on the page.
#[derive(Debug, Deserialize)]
pub struct FetchForm {
    #[serde(default)]
    pub topic: String,
}

/// Body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

/// Value of the session cookie, if the request carries one.
pub(crate) fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then_some(value)
        })
}

/// Wraps rendered HTML in a `200 OK` response.
///
/// # Headers
///
/// - `X-Paperlens-Cache`: set when `cache` is `Some`, from the fetch and rank
///   cache status (or `BYPASS` for answers).
/// - `Set-Cookie`: set only when the session was created by this request.
pub(crate) fn page_response(
    html: String,
    session: &ResolvedSession,
    cache: Option<CacheStatus>,
) -> Response {
    let mut headers = HeaderMap::new();

    if let Some(status) = cache {
        headers.insert(
            PAPERLENS_CACHE_HEADER,
            HeaderValue::from_static(status.as_header_value()),
        );
    }

    if session.created {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            session.id
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.insert(SET_COOKIE, value);
        }
    }

    (StatusCode::OK, headers, Html(html)).into_response()
}

/// Page notice for a blank topic or question, if `err` is one.
fn blank_input_notice(err: &ServiceError) -> Option<Notice> {
    match err.root() {
        ServiceError::EmptyTopic => Some(Notice::error(EMPTY_TOPIC_MESSAGE)),
        ServiceError::Answer(AnswerError::EmptyQuestion) => {
            Some(Notice::warning(EMPTY_QUESTION_MESSAGE))
        }
        _ => None,
    }
}

/// `GET /`: the empty page, with the session's last topic prefilled.
#[instrument(skip(state, headers))]
pub async fn index_handler<S>(
    State(state): State<HandlerState<S>>,
    headers: HeaderMap,
) -> Result<Response, GatewayError>
where
    S: PaperSource + 'static,
{
    let session = state.sessions.resolve(session_cookie(&headers));
    let topic = session
        .context
        .read()
        .batch
        .as_ref()
        .map(|batch| batch.topic.clone())
        .unwrap_or_default();

    let html = state.renderer.page(&PageView {
        topic,
        ..Default::default()
    })?;
    Ok(page_response(html, &session, None))
}

/// `POST /fetch`: fetches and ranks papers for the submitted topic.
///
/// # Flow
///
/// 1. Resolve the session.
/// 2. Run fetch and rank through the service caches.
/// 3. On a non-empty result, store the batch and ranked set in the session and
///    render the paper cards.
///
/// A blank topic or an empty upstream result renders an error notice and
/// leaves the session as it was.
///
/// # Errors
///
/// Source failures become `502`; embedder failures become `500`. A malformed
/// form body is a `400`.
#[instrument(skip(state, headers, form), fields(topic = tracing::field::Empty))]
pub async fn fetch_handler<S>(
    State(state): State<HandlerState<S>>,
    headers: HeaderMap,
    form: Result<Form<FetchForm>, FormRejection>,
) -> Result<Response, GatewayError>
where
    S: PaperSource + 'static,
{
    let Form(form) = form.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    tracing::Span::current().record("topic", form.topic.as_str());

    let session = state.sessions.resolve(session_cookie(&headers));

    let outcome = match state.service.fetch_and_rank(&form.topic).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let Some(notice) = blank_input_notice(&err) else {
                return Err(err.into());
            };
            debug!(session = %session.id, "Fetch submitted without a topic");
            let html = state.renderer.page(&PageView {
                topic: form.topic,
                notice: Some(notice),
                ..Default::default()
            })?;
            return Ok(page_response(html, &session, None));
        }
    };

    let (view, cache) = match outcome {
        FetchOutcome::NoPapers => {
            debug!(session = %session.id, "Fetch returned no papers; session left unchanged");
            let view = PageView {
                topic: form.topic,
                notice: Some(Notice::error(NO_PAPERS_MESSAGE)),
                ..Default::default()
            };
            (view, None)
        }
        FetchOutcome::Ranked {
            batch,
            ranked,
            cache,
        } => {
            let papers = PapersView::new(batch.len(), &ranked);
            info!(
                session = %session.id,
                fetched = batch.len(),
                ranked = ranked.len(),
                cache = %cache,
                "Stored ranked papers in session"
            );
            session.context.write().store(batch, ranked);

            let view = PageView {
                topic: form.topic,
                papers: Some(papers),
                ..Default::default()
            };
            (view, Some(cache))
        }
    };

    let html = state.renderer.page(&view)?;
    Ok(page_response(html, &session, cache))
}

/// `POST /ask`: answers the submitted question from the session's ranked papers.
///
/// Without a ranked set in the session, renders a warning and never invokes
/// the models. A blank question also renders a warning. Answers are never
/// cached, so the response always carries `X-Paperlens-Cache: BYPASS`.
///
/// # Errors
///
/// Embedder or generator failures become `500`. A malformed form body is a
/// `400`.
#[instrument(skip(state, headers, form))]
pub async fn ask_handler<S>(
    State(state): State<HandlerState<S>>,
    headers: HeaderMap,
    form: Result<Form<AskForm>, FormRejection>,
) -> Result<Response, GatewayError>
where
    S: PaperSource + 'static,
{
    let Form(form) = form.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let session = state.sessions.resolve(session_cookie(&headers));

    let stored = session.context.read().ranked().cloned();
    let Some(ranked) = stored else {
        debug!(session = %session.id, "Question asked before any fetch");
        let html = state.renderer.page(&PageView {
            question: form.question,
            notice: Some(Notice::warning(FETCH_FIRST_MESSAGE)),
            ..Default::default()
        })?;
        return Ok(page_response(html, &session, None));
    };

    let view = match state.service.answer(&form.question, &ranked).await {
        Ok(answer) => PageView {
            question: form.question,
            answer: Some(AnswerView::from(&answer)),
            ..Default::default()
        },
        Err(err) => {
            let Some(notice) = blank_input_notice(&err) else {
                return Err(err.into());
            };
            debug!(session = %session.id, "Ask submitted without a question");
            PageView {
                question: form.question,
                notice: Some(notice),
                ..Default::default()
            }
        }
    };

    let html = state.renderer.page(&view)?;
    Ok(page_response(html, &session, Some(CacheStatus::Bypass)))
}
