//! Webhook endpoint for inbound platform updates
//!
//! The platform expects a prompt 2xx; flow execution is spawned onto its own
//! task so a slow traversal (delay nodes in particular) never stalls the
//! acknowledgement. Updates that carry nothing executable are acknowledged
//! and dropped so the platform does not retry them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use botflow_core::InboundEvent;
use botflow_telegram::Update;

use crate::registry::InstanceRegistry;

/// Handler for inbound updates on `/webhook/:bot_id`
pub async fn webhook_handler(
    State(registry): State<Arc<InstanceRegistry>>,
    Path(bot_id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    let Some(instance) = registry.get(&bot_id) else {
        debug!(%bot_id, "Update for unknown bot");
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Bot not found" })),
        )
            .into_response();
    };

    let update: Update = match serde_json::from_value(payload) {
        Ok(update) => update,
        Err(err) => {
            debug!(%bot_id, ?err, "Unparseable update payload, acknowledging");
            return StatusCode::OK.into_response();
        }
    };

    let Some(message) = update.message else {
        debug!(%bot_id, update_id = update.update_id, "Update without message, acknowledging");
        return StatusCode::OK.into_response();
    };

    let (Some(text), Some(from)) = (message.text, message.from) else {
        debug!(%bot_id, update_id = update.update_id, "Message without text or sender, acknowledging");
        return StatusCode::OK.into_response();
    };

    let event = InboundEvent {
        chat_id: message.chat.id,
        user_id: from.id,
        text,
        update_id: update.update_id,
    };

    let executor = instance.executor.clone();
    tokio::spawn(async move {
        executor.process_event(event).await;
    });

    StatusCode::OK.into_response()
}
