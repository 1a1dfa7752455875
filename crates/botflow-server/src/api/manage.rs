//! Bot management endpoint
//!
//! A single action-dispatch endpoint, shaped for the browser-based flow
//! editor: `{"action": "deploy", ...}` or `{"action": "stop", ...}`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::api::errors::api_error_response;
use crate::registry::{DeployRequest, InstanceRegistry};

/// Management request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageRequest {
    /// Action to perform: "deploy" or "stop"
    #[serde(default)]
    pub action: Option<String>,

    /// Bot identifier
    #[serde(default)]
    pub bot_id: Option<String>,

    /// Owning editor user; carried for audit logging only
    #[serde(default)]
    pub user_id: Option<String>,

    /// Telegram bot token (deploy only)
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Flow graph JSON (deploy only)
    #[serde(default)]
    pub flow_data: Option<Value>,

    /// Display name (deploy only)
    #[serde(default)]
    pub bot_name: Option<String>,
}

/// Handler for the management endpoint
pub async fn manage_handler(
    State(registry): State<Arc<InstanceRegistry>>,
    Json(request): Json<ManageRequest>,
) -> Response {
    match request.action.as_deref() {
        Some("deploy") => deploy(registry, request).await,
        Some("stop") => stop(registry, request).await,
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Unknown action" })),
        )
            .into_response(),
    }
}

async fn deploy(registry: Arc<InstanceRegistry>, request: ManageRequest) -> Response {
    let (bot_id, token, flow) = match (request.bot_id, request.bot_token, request.flow_data) {
        (Some(bot_id), Some(token), Some(flow)) if !bot_id.is_empty() && !token.is_empty() => {
            (bot_id, token, flow)
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing required fields" })),
            )
                .into_response();
        }
    };

    let name = request.bot_name.unwrap_or_else(|| bot_id.clone());

    info!(%bot_id, user_id = ?request.user_id, "Deploy requested");

    match registry
        .deploy(DeployRequest {
            bot_id,
            name,
            token,
            flow,
        })
        .await
    {
        Ok(instance) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Bot deployed successfully",
                "webhookUrl": instance.webhook_url,
            })),
        )
            .into_response(),
        Err(err) => api_error_response(&err),
    }
}

async fn stop(registry: Arc<InstanceRegistry>, request: ManageRequest) -> Response {
    let bot_id = match request.bot_id {
        Some(bot_id) if !bot_id.is_empty() => bot_id,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Bot ID required" })),
            )
                .into_response();
        }
    };

    info!(%bot_id, user_id = ?request.user_id, "Stop requested");

    match registry.stop(&bot_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Bot stopped" })),
        )
            .into_response(),
        Err(err) => api_error_response(&err),
    }
}
