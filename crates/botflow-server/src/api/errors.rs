//! HTTP mapping for server errors

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;

use crate::error::ServerError;

/// Convert a server error into the API's JSON error response
pub fn api_error_response(err: &ServerError) -> Response {
    match err {
        ServerError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("{} not found", what) })),
        )
            .into_response(),

        ServerError::ValidationError(msg) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": msg })),
        )
            .into_response(),

        ServerError::InvalidBotToken => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid bot token" })),
        )
            .into_response(),

        ServerError::WebhookSetupFailed(details) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to set webhook", "details": details })),
        )
            .into_response(),

        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error", "details": other.to_string() })),
        )
            .into_response(),
    }
}
