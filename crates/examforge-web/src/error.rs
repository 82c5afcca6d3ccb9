use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use examforge_core::ExamError;

use crate::html::error_page;

/// Result type for route handlers.
pub type Result<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Exam(#[from] ExamError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Exam(ExamError::MissingSession) => StatusCode::BAD_REQUEST,
            WebError::Exam(ExamError::TimedOut { .. }) => StatusCode::GATEWAY_TIMEOUT,
            WebError::Exam(
                ExamError::SchemaViolation { .. }
                | ExamError::EvaluationCountMismatch { .. }
                | ExamError::Provider(_),
            ) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self:#}");
        } else {
            tracing::warn!("{self}");
        }
        (status, Html(error_page(status.as_u16(), &self.to_string()))).into_response()
    }
}
