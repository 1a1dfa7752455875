//! Bot instance registry
//!
//! Deployed bots live in a concurrent map keyed by bot id. Deploying a bot
//! verifies its token, registers its webhook, and publishes an executor;
//! stopping removes the instance and best-effort unregisters the webhook.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};

use botflow_core::{FlowExecutor, FlowGraph, InteractionLogger};
use botflow_telegram::TelegramClient;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// A deployment request for one bot
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Caller-chosen bot identifier, also the webhook path segment
    pub bot_id: String,

    /// Display name
    pub name: String,

    /// Telegram bot token
    pub token: String,

    /// Flow graph as produced by the visual editor
    pub flow: Value,
}

/// One running bot
pub struct BotInstance {
    /// Bot identifier
    pub bot_id: String,

    /// Display name
    pub name: String,

    /// Bot username reported by the platform at deploy time
    pub username: Option<String>,

    /// Webhook URL registered for this bot
    pub webhook_url: String,

    /// API client bound to this bot's token
    pub client: TelegramClient,

    /// Executor handling this bot's inbound events
    pub executor: Arc<FlowExecutor>,

    /// When the instance was published
    pub deployed_at: DateTime<Utc>,
}

impl std::fmt::Debug for BotInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotInstance")
            .field("bot_id", &self.bot_id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("webhook_url", &self.webhook_url)
            .field("deployed_at", &self.deployed_at)
            .finish_non_exhaustive()
    }
}

/// Registry of running bot instances
pub struct InstanceRegistry {
    /// Running instances, keyed by bot id
    instances: DashMap<String, Arc<BotInstance>>,

    /// Base URL for the Telegram API, shared by all instances
    telegram_api_base: String,

    /// Public base URL webhooks are registered under
    public_url: String,

    /// Interaction logger shared by all executors
    logger: Arc<dyn InteractionLogger>,
}

impl InstanceRegistry {
    /// Create an empty registry
    pub fn new(config: &ServerConfig, logger: Arc<dyn InteractionLogger>) -> Self {
        Self {
            instances: DashMap::new(),
            telegram_api_base: config.telegram_api_base.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
            logger,
        }
    }

    /// Deploy a bot: validate its flow, verify its token, register its
    /// webhook, and publish the instance
    ///
    /// Deploying an id that is already running replaces the previous
    /// instance; in-flight traversals on the old executor run to completion.
    pub async fn deploy(&self, request: DeployRequest) -> ServerResult<Arc<BotInstance>> {
        let span = info_span!("deploy_bot", bot_id = %request.bot_id);
        async move {
            let graph = FlowGraph::from_value(request.flow)
                .map_err(|err| ServerError::ValidationError(err.to_string()))?;

            let client = TelegramClient::new(&request.token)
                .with_api_base(&self.telegram_api_base);

            let profile = client.get_me().await.map_err(|err| {
                warn!(?err, "Token verification failed");
                ServerError::InvalidBotToken
            })?;

            let webhook_url = format!("{}/webhook/{}", self.public_url, request.bot_id);
            client.set_webhook(&webhook_url).await.map_err(|err| {
                warn!(?err, %webhook_url, "Webhook registration failed");
                ServerError::WebhookSetupFailed(err.to_string())
            })?;

            let executor = Arc::new(FlowExecutor::new(
                request.bot_id.clone(),
                Arc::new(graph),
                Arc::new(client.clone()),
                self.logger.clone(),
            ));

            let instance = Arc::new(BotInstance {
                bot_id: request.bot_id.clone(),
                name: request.name,
                username: profile.username,
                webhook_url,
                client,
                executor,
                deployed_at: Utc::now(),
            });

            if self
                .instances
                .insert(request.bot_id.clone(), instance.clone())
                .is_some()
            {
                info!("Replaced previously running instance");
            }

            info!(username = ?instance.username, "Bot deployed");
            Ok(instance)
        }
        .instrument(span)
        .await
    }

    /// Stop a bot: remove it from the registry and best-effort unregister
    /// its webhook
    ///
    /// Stopping an unknown id is not an error.
    pub async fn stop(&self, bot_id: &str) -> ServerResult<()> {
        match self.instances.remove(bot_id) {
            Some((_, instance)) => {
                if let Err(err) = instance.client.delete_webhook().await {
                    warn!(?err, bot_id, "Failed to delete webhook during stop");
                }
                info!(bot_id, "Bot stopped");
            }
            None => {
                debug!(bot_id, "Stop requested for unknown bot");
            }
        }
        Ok(())
    }

    /// Look up a running instance
    pub fn get(&self, bot_id: &str) -> Option<Arc<BotInstance>> {
        self.instances.get(bot_id).map(|entry| entry.value().clone())
    }

    /// Number of running instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the registry has no running instances
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
