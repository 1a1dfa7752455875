//!
//! Botflow Telegram - Telegram Bot API adapter for the Botflow platform
//!
//! Implements the core crate's [`MessageSender`](botflow_core::MessageSender)
//! port over the Telegram Bot API, plus the webhook-management calls the
//! server uses when deploying and stopping bots.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// API client
pub mod client;

/// Error types
pub mod error;

/// Wire types
pub mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::{ApiResponse, BotProfile, Chat, Message, Update, User};
