//! Chat port - Interface to the messaging transport
//!
//! The transport (Telegram in production, a capturing fake in tests) is an
//! external collaborator; the application only ever talks to it through
//! this trait. Delivery is best-effort: a failed send is an error for the
//! caller to log, not a reason to retry here.

use async_trait::async_trait;

use crate::domain::value_objects::OwnerId;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("chat API rejected the request: {0}")]
    Api(String),
}

/// Outbound messaging operations.
#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Send a direct reply to an owner's chat.
    async fn reply(&self, owner: OwnerId, text: &str) -> Result<(), ChatError>;

    /// Publish to the shared broadcast channel.
    async fn broadcast(&self, channel: &str, text: &str) -> Result<(), ChatError>;
}
