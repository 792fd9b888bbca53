use crate::services::template_save::TemplateWriteError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    Internal(String),
    /// A rejected editor write; the full structured error is rendered so
    /// operators can triage schema and policy problems from the dashboard.
    Write(TemplateWriteError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Write(e) => write!(f, "Write rejected: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<TemplateWriteError> for ApiError {
    fn from(e: TemplateWriteError) -> Self {
        ApiError::Write(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => simple(StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => simple(StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => simple(StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Conflict(msg) => simple(StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => simple(StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Write(e) => {
                let status = e
                    .status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let body = Json(json!({
                    "error": e.message,
                    "status": e.status,
                    "code": e.code,
                    "details": e.details,
                    "hint": e.hint,
                    "sent_keys": e.sent_keys,
                }));
                (status, body).into_response()
            }
        }
    }
}

fn simple(status: StatusCode, message: String) -> Response {
    let body = Json(json!({
        "error": message
    }));
    (status, body).into_response()
}

pub type ApiResult<T> = Result<T, ApiError>;
