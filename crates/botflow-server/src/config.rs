//! Configuration for the Botflow server
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Public base URL this server is reachable at, used to build the
    /// webhook URLs registered with Telegram
    pub public_url: String,

    /// Base URL of the Telegram Bot API
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,

    /// Endpoint interaction records are posted to; records are discarded
    /// when unset
    #[serde(default)]
    pub interaction_log_url: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override from environment variables
        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SERVER_PORT value: {}", port);
            }
        }

        if let Ok(host) = env::var("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Ok(public_url) = env::var("PUBLIC_URL") {
            config.public_url = public_url;
        }

        if let Ok(telegram_api_base) = env::var("TELEGRAM_API_BASE") {
            config.telegram_api_base = telegram_api_base;
        }

        if let Ok(interaction_log_url) = env::var("INTERACTION_LOG_URL") {
            config.interaction_log_url = Some(interaction_log_url);
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        // Validate required fields
        if config.public_url.is_empty() {
            return Err(ServerError::ConfigError(
                "PUBLIC_URL is required".to_string(),
            ));
        }

        // Add warnings for missing optional fields
        if config.interaction_log_url.is_none() {
            warn!("No INTERACTION_LOG_URL provided - interaction records will be discarded");
        }

        info!("Loaded server configuration");
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            public_url: String::new(),
            telegram_api_base: default_telegram_api_base(),
            interaction_log_url: None,
            log_level: default_log_level(),
        }
    }
}
