use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::infrastructure::database::DatabaseError;
use crate::llm::LlmError;

pub const API_KEY_REWRITE: &str = "API密钥无效或未设置";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Upstream(String),
    Internal(String),
}

impl AppError {
    pub fn upstream(e: &LlmError) -> Self {
        AppError::Upstream(sanitize_upstream_message(&e.to_string()))
    }
}

/// Provider error strings can quote request details, API key included.
/// Any message that mentions a key is replaced wholesale.
pub fn sanitize_upstream_message(message: &str) -> String {
    let lowered = message.to_lowercase();
    if lowered.contains("api key") || lowered.contains("api_key") {
        API_KEY_REWRITE.to_string()
    } else {
        message.to_string()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Upstream(msg) | AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DatabaseError> for AppError {
    fn from(e: DatabaseError) -> Self {
        AppError::Internal(e.to_string())
    }
}
