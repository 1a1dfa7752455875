//! Wire types for the Telegram Bot API
//!
//! Only the fields the runtime reads are modeled; everything else in the
//! payload is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Standard Telegram API response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded
    pub ok: bool,

    /// Payload, present when `ok` is true
    pub result: Option<T>,

    /// Human-readable error, present when `ok` is false
    pub description: Option<String>,
}

/// The bot's own profile, as returned by `getMe`
#[derive(Debug, Clone, Deserialize)]
pub struct BotProfile {
    /// Telegram's numeric bot identifier
    pub id: i64,

    /// Whether the account is a bot (always true for valid bot tokens)
    pub is_bot: bool,

    /// Display name
    pub first_name: String,

    /// Bot username, without the leading `@`
    #[serde(default)]
    pub username: Option<String>,
}

/// One incoming update delivered to a webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    /// Monotonically increasing update identifier
    pub update_id: i64,

    /// The new message, if this update carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// A Telegram message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier within the chat
    pub message_id: i64,

    /// Sender, absent for channel posts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,

    /// Chat the message belongs to
    pub chat: Chat,

    /// Text content, absent for media-only messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A Telegram user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: i64,
}

/// A Telegram chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat identifier
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_text_message() {
        let raw = r#"{
            "update_id": 900001,
            "message": {
                "message_id": 55,
                "from": { "id": 12345, "is_bot": false, "first_name": "Ada" },
                "chat": { "id": 67890, "type": "private" },
                "text": "/start",
                "date": 1693000000
            }
        }"#;

        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(update.update_id, 900001);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 67890);
        assert_eq!(message.from.unwrap().id, 12345);
        assert_eq!(message.text.as_deref(), Some("/start"));
    }

    #[test]
    fn test_update_without_message() {
        let raw = r#"{ "update_id": 900002, "edited_message": { "message_id": 1 } }"#;

        let update: Update = serde_json::from_str(raw).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_api_error_envelope() {
        let raw = r#"{ "ok": false, "error_code": 401, "description": "Unauthorized" }"#;

        let response: ApiResponse<BotProfile> = serde_json::from_str(raw).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }
}
