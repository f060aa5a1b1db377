//! Mapping of core errors and extractor rejections onto HTTP responses.
//!
//! Bodies follow the REST conventions clients already expect:
//! `{"detail": "..."}` for general errors and `{"field": ["..."]}` for
//! validation failures.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use threads_core::ThreadsError;
use tracing::error;

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";

#[derive(Debug)]
pub enum ApiError {
    Core(ThreadsError),
    BadRequest(String),
    NotFound(String),
    NotAuthenticated,
}

impl From<ThreadsError> for ApiError {
    fn from(err: ThreadsError) -> Self {
        ApiError::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    // Non-numeric ids never match a route in the URL scheme.
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound("Not found.".to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Core(ThreadsError::Other(format!("Background task failed: {}", err)))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(ThreadsError::Validation { field, message }) => {
                let mut errors = serde_json::Map::new();
                errors.insert(field.clone(), json!([message]));
                Value::Object(errors)
            }
            ApiError::Core(err) if err.is_client_error() => json!({ "detail": err.to_string() }),
            ApiError::Core(err) => {
                error!("Internal error: {}", err);
                json!({ "detail": "A server error occurred." })
            }
            ApiError::BadRequest(message) | ApiError::NotFound(message) => {
                json!({ "detail": message })
            }
            ApiError::NotAuthenticated => json!({ "detail": NOT_AUTHENTICATED }),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"api\""),
            );
        }
        response
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
