//! HTTP client for the Telegram Bot API

use crate::error::TelegramError;
use crate::types::{ApiResponse, BotProfile};
use async_trait::async_trait;
use botflow_core::{CoreError, MessageSender};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error};

/// Default Telegram API host
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Updates the platform should deliver to webhooks
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Client for one bot's slice of the Telegram Bot API
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    /// Bot token, embedded in every request path
    token: String,

    /// Base URL for the API (overridable for tests)
    api_base: String,

    /// HTTP client
    client: Client,
}

impl TelegramClient {
    /// Create a client for the given bot token against the real API host
    pub fn new(token: impl Into<String>) -> Self {
        // Create a reqwest client with reasonable defaults
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Point the client at a different API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Format the endpoint URL for an API method
    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Call an API method and unwrap the response envelope
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, TelegramError> {
        debug!(method, "Calling Telegram API");

        let response = self
            .client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await?;

        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "unknown error".to_string());
            error!(method, %description, "Telegram API call failed");
            return Err(TelegramError::ApiError(description));
        }

        envelope.result.ok_or_else(|| {
            TelegramError::SerializationError(format!("{} response had no result", method))
        })
    }

    /// Verify the token and fetch the bot's own profile
    pub async fn get_me(&self) -> Result<BotProfile, TelegramError> {
        self.call("getMe", &json!({})).await
    }

    /// Send an HTML-formatted text message to a chat
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        self.call::<serde_json::Value>("sendMessage", &body).await?;
        Ok(())
    }

    /// Register a webhook URL for this bot
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        let body = json!({
            "url": url,
            "allowed_updates": ALLOWED_UPDATES,
        });
        self.call::<bool>("setWebhook", &body).await?;
        Ok(())
    }

    /// Remove this bot's webhook registration
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        self.call::<bool>("deleteWebhook", &json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), CoreError> {
        TelegramClient::send_message(self, chat_id, text)
            .await
            .map_err(CoreError::from)
    }
}
