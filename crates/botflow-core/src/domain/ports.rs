//! Port traits implemented by infrastructure crates
//!
//! The core crate defines *what* it needs from the outside world; the
//! messaging and logging crates define *how* to supply it.

use crate::domain::event::InteractionRecord;
use crate::CoreError;
use async_trait::async_trait;

/// Outbound message delivery, keyed by the owning bot's credential
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message to a chat
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), CoreError>;
}

/// Best-effort recorder of processed events
///
/// Implementations must swallow their own failures: logging is observability
/// loss, not functional loss, and must never fail or delay the triggering
/// request.
#[async_trait]
pub trait InteractionLogger: Send + Sync {
    /// Record one processed event
    async fn log_interaction(&self, record: InteractionRecord);
}

/// Logger that discards all records
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInteractionLogger;

#[async_trait]
impl InteractionLogger for NoopInteractionLogger {
    async fn log_interaction(&self, _record: InteractionRecord) {}
}
