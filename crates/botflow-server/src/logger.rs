//! Interaction logger implementations
//!
//! The HTTP logger posts records to an external collection endpoint.
//! Failures are logged and swallowed; recording is observability, not part
//! of the request path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use botflow_core::{InteractionLogger, InteractionRecord, NoopInteractionLogger};

use crate::config::ServerConfig;

/// Posts interaction records to an HTTP endpoint
pub struct HttpInteractionLogger {
    /// Collection endpoint
    endpoint: String,

    /// HTTP client
    client: Client,
}

impl HttpInteractionLogger {
    /// Create a logger posting to the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        // Create a reqwest client with reasonable defaults
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl InteractionLogger for HttpInteractionLogger {
    async fn log_interaction(&self, record: InteractionRecord) {
        let result = self.client.post(&self.endpoint).json(&record).send().await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(bot_id = %record.bot_id, "Interaction recorded");
            }
            Ok(response) => {
                warn!(
                    status = %response.status(),
                    bot_id = %record.bot_id,
                    "Interaction log endpoint returned an error"
                );
            }
            Err(err) => {
                warn!(?err, bot_id = %record.bot_id, "Failed to record interaction");
            }
        }
    }
}

/// Pick the interaction logger implied by the configuration
pub fn interaction_logger(config: &ServerConfig) -> Arc<dyn InteractionLogger> {
    match &config.interaction_log_url {
        Some(url) => Arc::new(HttpInteractionLogger::new(url)),
        None => Arc::new(NoopInteractionLogger),
    }
}
