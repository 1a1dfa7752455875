//! API module for the Botflow server
//!
//! This module contains the API routes and handlers for the Botflow server.

use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod manage;
pub mod webhook;

use crate::registry::InstanceRegistry;

/// Build the router for API endpoints
pub fn build_router(registry: Arc<InstanceRegistry>) -> Router {
    Router::new()
        // Bot management (deploy / stop)
        .route("/", post(manage::manage_handler))
        // Inbound platform updates
        .route("/webhook/:bot_id", post(webhook::webhook_handler))
        // Health check
        .route("/health", get(health_check))
        // The management endpoint is called from the browser-based editor
        .layer(
            CorsLayer::new()
                .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        // Shared state
        .with_state(registry)
}

/// Handler for health checks
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
