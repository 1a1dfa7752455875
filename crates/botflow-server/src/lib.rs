//!
//! Botflow Server - Webhook gateway and bot registry for the Botflow platform
//!
//! Receives Telegram updates on per-bot webhook paths, routes them to the
//! owning bot's flow executor, and exposes a management endpoint for
//! deploying and stopping bots.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// API routes and handlers
pub mod api;

/// Configuration
pub mod config;

/// Error types
pub mod error;

/// Interaction logger implementations
pub mod logger;

/// Bot instance registry
pub mod registry;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use logger::HttpInteractionLogger;
pub use registry::{BotInstance, DeployRequest, InstanceRegistry};

/// Initialize logging from the configured level
///
/// `RUST_LOG` takes precedence over the configuration when set.
pub fn init_logging(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run the server until the listener fails
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    info!("Starting Botflow server");

    let logger = logger::interaction_logger(&config);
    let registry = Arc::new(InstanceRegistry::new(&config, logger));

    // Build the API router
    let app = api::build_router(registry);

    // Create and bind the TCP listener
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    // Run the server
    axum::serve(listener, app).await?;

    Ok(())
}
