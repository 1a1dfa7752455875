use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized form of one inbound platform update
///
/// Produced by the webhook gateway from the platform's wire format; this is
/// the only shape the matcher and executor ever see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Chat the message arrived in
    pub chat_id: i64,

    /// User who sent the message
    pub user_id: i64,

    /// Message text (empty if the update carried none)
    pub text: String,

    /// The platform's update identifier
    pub update_id: i64,
}

/// One processed-event record handed to the interaction logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Bot the event was routed to
    pub bot_id: String,

    /// Platform user identifier
    pub telegram_user_id: String,

    /// Platform chat identifier
    pub telegram_chat_id: String,

    /// The message text that was processed
    pub message_text: String,

    /// Interaction type tag (e.g. "message_received")
    pub interaction_type: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl InteractionRecord {
    /// Build a "message_received" record for a processed event
    pub fn message_received(bot_id: &str, event: &InboundEvent) -> Self {
        Self {
            bot_id: bot_id.to_string(),
            telegram_user_id: event.user_id.to_string(),
            telegram_chat_id: event.chat_id.to_string(),
            message_text: event.text.clone(),
            interaction_type: "message_received".to_string(),
            created_at: Utc::now(),
        }
    }
}
