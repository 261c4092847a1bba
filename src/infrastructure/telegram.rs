//! Telegram Bot API client
//!
//! Thin transport adapter: long-polls `getUpdates` for inbound messages and
//! sends Markdown replies via `sendMessage`. All routing decisions live in
//! the chat service; this module only moves messages.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::application::dto::IncomingMessage;
use crate::application::ports::outbound::{ChatError, ChatPort};
use crate::application::services::ChatService;
use crate::domain::value_objects::OwnerId;

/// Long-poll wait passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;
/// Pause before retrying after a failed poll.
const POLL_RETRY_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

/// Client for the Telegram Bot API
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<T, ChatError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let api: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if !api.ok {
            return Err(ChatError::Api(
                api.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        api.result
            .ok_or_else(|| ChatError::Api("missing result".to_string()))
    }

    /// Fetch updates newer than `offset`, blocking server-side for up to
    /// [`POLL_TIMEOUT_SECS`].
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ChatError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    async fn send_message(&self, chat_id: serde_json::Value, text: &str) -> Result<(), ChatError> {
        // The message object comes back on success; we only need the ack.
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": chat_id,
                    "text": text,
                    "parse_mode": "Markdown",
                }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ChatPort for TelegramClient {
    async fn reply(&self, owner: OwnerId, text: &str) -> Result<(), ChatError> {
        self.send_message(json!(owner.as_i64()), text).await
    }

    async fn broadcast(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        self.send_message(json!(channel), text).await
    }
}

/// Long-poll loop: fetch updates, hand each message to the chat service.
/// Poll failures are logged and retried after a short pause; handler
/// failures are logged per message and never stop the loop.
pub async fn run_polling(client: Arc<TelegramClient>, chat_service: Arc<ChatService>) {
    tracing::info!("telegram polling started");
    let mut offset = 0i64;
    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                tracing::error!("getUpdates failed: {err}");
                tokio::time::sleep(std::time::Duration::from_secs(POLL_RETRY_SECS)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let (Some(from), Some(text)) = (message.from, message.text) else {
                continue;
            };

            let incoming = IncomingMessage {
                owner_id: OwnerId::new(from.id),
                owner_name: from.username,
                text,
            };
            if let Err(err) = chat_service.handle(incoming).await {
                tracing::error!(chat_id = message.chat.id, "failed to handle message: {err:#}");
            }
        }
    }
}
