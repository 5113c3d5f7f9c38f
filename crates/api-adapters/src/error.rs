//! API error type and its JSON rendering.
//!
//! Body shape for every failure: `{"error": <kind>, "message": <text>, "timestamp": <rfc3339>}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use domains::{AppError, ErrorKind};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    /// No credential, or one that resolves to nobody
    #[error("authentication required")]
    Unauthenticated,

    #[error("rate limit exceeded, try again later")]
    RateLimited,

    /// Body, path or query that could not be decoded
    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::App(e) => StatusCode::from_u16(e.kind().http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::App(e) => e.kind().as_str(),
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::RateLimited => "rate_limited",
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Store details stay in the log.
            ApiError::App(e) if e.kind() == ErrorKind::Internal => {
                error!(error = %e, "request failed");
                "internal server error".to_string()
            }
            ApiError::App(AppError::Validation(v)) => v.to_string(),
            ApiError::App(AppError::NotFound(m))
            | ApiError::App(AppError::Conflict(m))
            | ApiError::App(AppError::Unauthorized(m)) => m.clone(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.kind(),
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<domains::ValidationError> for ApiError {
    fn from(err: domains::ValidationError) -> Self {
        ApiError::App(AppError::Validation(err))
    }
}
