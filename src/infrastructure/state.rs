//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::ChatPort;
use crate::application::services::{ChatService, ConversationServiceImpl, EventGenerationServiceImpl};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::SqliteStore;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<SqliteStore>,
    pub event_service: Arc<EventGenerationServiceImpl>,
    pub chat_service: Arc<ChatService>,
}

impl AppState {
    pub async fn new(config: AppConfig, chat: Arc<dyn ChatPort>) -> Result<Self> {
        // Open the store and make sure the schema exists
        let store = Arc::new(SqliteStore::connect(&config.database_path).await?);

        let conversation_service = Arc::new(ConversationServiceImpl::new(
            store.clone(),
            Arc::new(config.vocabularies.clone()),
        ));
        let event_service = Arc::new(EventGenerationServiceImpl::new(
            store.clone(),
            store.clone(),
        ));
        let chat_service = Arc::new(ChatService::new(
            conversation_service,
            store.clone(),
            store.clone(),
            store.clone(),
            chat,
            config.event_channel.clone(),
        ));

        Ok(Self {
            config,
            store,
            event_service,
            chat_service,
        })
    }
}
