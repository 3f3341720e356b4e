//! HTTP gateway (Axum) for the research pages.
//!
//! This module is primarily used by the `paperlens` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod render;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use handler::{ask_handler, fetch_handler, index_handler};
pub use render::Renderer;
pub use state::HandlerState;

use paperlens::cache::{
    PAPERLENS_STATUS_ERROR, PAPERLENS_STATUS_HEADER, PAPERLENS_STATUS_HEALTHY,
    PAPERLENS_STATUS_NOT_READY, PAPERLENS_STATUS_READY,
};
use paperlens::service::ModelHub;
use paperlens::source::PaperSource;

pub fn create_router_with_state<S>(state: HandlerState<S>) -> Router
where
    S: PaperSource + 'static,
{
    Router::new()
        .route("/", get(index_handler::<S>))
        .route("/fetch", post(fetch_handler::<S>))
        .route("/ask", post(ask_handler::<S>))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub source: &'static str,
    pub models: &'static str,
    pub embedder_mode: &'static str,
    pub generator_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        PAPERLENS_STATUS_HEADER,
        HeaderValue::from_static(PAPERLENS_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

fn mode_label(stub: bool) -> &'static str {
    if stub { "stub" } else { "real" }
}

/// Backend modes, from the loaded models or else from the configured paths.
fn model_modes(hub: &ModelHub) -> (&'static str, &'static str) {
    match hub.loaded() {
        Some(models) => (
            mode_label(models.embedder.is_stub()),
            mode_label(models.generator.is_stub()),
        ),
        None => (
            mode_label(hub.paths().embedder.is_none()),
            mode_label(hub.paths().generator.is_none()),
        ),
    }
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<S>(State(state): State<HandlerState<S>>) -> Response
where
    S: PaperSource + 'static,
{
    let source_status = if state.service.is_ready().await {
        PAPERLENS_STATUS_READY
    } else {
        PAPERLENS_STATUS_NOT_READY
    };

    let hub = state.service.models();
    let models_status = if hub.is_loaded() {
        PAPERLENS_STATUS_READY
    } else {
        "pending"
    };
    let (embedder_mode, generator_mode) = model_modes(hub);

    let components = ComponentStatus {
        http: PAPERLENS_STATUS_READY,
        source: source_status,
        models: models_status,
        embedder_mode,
        generator_mode,
    };

    let is_ready = components.source == PAPERLENS_STATUS_READY
        && components.models == PAPERLENS_STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(
        PAPERLENS_STATUS_HEADER,
        HeaderValue::from_str(status_msg)
            .unwrap_or(HeaderValue::from_static(PAPERLENS_STATUS_ERROR)),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
