use botflow_core::CoreError;
use thiserror::Error;

/// Errors from the Telegram Bot API client
#[derive(Error, Debug)]
pub enum TelegramError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The API answered with `ok: false`
    #[error("Telegram API error: {0}")]
    ApiError(String),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::RequestFailed(err.to_string())
    }
}

impl From<serde_json::Error> for TelegramError {
    fn from(err: serde_json::Error) -> Self {
        TelegramError::SerializationError(err.to_string())
    }
}

impl From<TelegramError> for CoreError {
    fn from(err: TelegramError) -> Self {
        CoreError::SendError(err.to_string())
    }
}
