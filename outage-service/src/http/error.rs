use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{announcement::AnnouncementError, sources::SourceError};

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Announcement(#[from] AnnouncementError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Source(_) => (StatusCode::BAD_GATEWAY, "EVENT_SOURCE_ERROR"),
            AppError::Announcement(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ANNOUNCEMENT_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            metrics::counter!("http_requests_failed_total").increment(1);
        }

        let body = ApiError {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
