//! Error types for the Botflow server
//!
//! This module contains the error types used throughout the server.

use botflow_core::CoreError;
use botflow_telegram::TelegramError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The bot token was rejected by the platform
    #[error("Invalid bot token")]
    InvalidBotToken,

    /// Webhook registration with the platform failed
    #[error("Failed to set webhook: {0}")]
    WebhookSetupFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

// Implement conversions from other error types
impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => ServerError::ValidationError(msg),
            other => ServerError::InternalError(other.to_string()),
        }
    }
}

impl From<TelegramError> for ServerError {
    fn from(err: TelegramError) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::IoError(err.to_string())
    }
}
