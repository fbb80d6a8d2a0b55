//! Central translation from [`CoreError`] to an HTTP response.
//!
//! Every handler returns `Result<T, ApiError>`; this is the only place
//! that decides status codes and the `{"detail": "..."}` body shape, so
//! no handler needs to think about HTTP beyond building its success
//! response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use studyforge_core::CoreError;

pub struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            CoreError::BadInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            CoreError::UpstreamTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg.clone()),
            CoreError::Upstream(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            CoreError::Generation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            CoreError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "internal error");
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}
