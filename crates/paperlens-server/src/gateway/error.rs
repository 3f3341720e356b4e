use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use paperlens::answer::AnswerError;
use paperlens::cache::PAPERLENS_STATUS_HEADER;
use paperlens::service::ServiceError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("paper source failed: {0}")]
    SourceFailed(String),

    #[error("model failed: {0}")]
    ModelFailed(String),

    #[error("render failed: {0}")]
    RenderFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<ServiceError> for GatewayError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err.root() {
            ServiceError::EmptyTopic
            | ServiceError::Answer(AnswerError::EmptyQuestion | AnswerError::NoPapers) => {
                GatewayError::InvalidRequest(message)
            }
            ServiceError::Source(_) => GatewayError::SourceFailed(message),
            ServiceError::Ranking(_)
            | ServiceError::Answer(_)
            | ServiceError::EmbedderLoad(_)
            | ServiceError::GeneratorLoad(_) => GatewayError::ModelFailed(message),
            ServiceError::TaskFailed { .. } | ServiceError::Shared(_) => {
                GatewayError::InternalError(message)
            }
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, status_label) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::SourceFailed(_) => (StatusCode::BAD_GATEWAY, "source_error"),
            GatewayError::ModelFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "model_error"),
            GatewayError::RenderFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "render_error"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            PAPERLENS_STATUS_HEADER,
            HeaderValue::from_static(status_label),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
