//! Inbound message types - What the transport delivers per message
//!
//! The transport hands over `(owner, optional display name, text)`; command
//! recognition happens here so the transport stays a dumb pipe.

use crate::domain::value_objects::OwnerId;

/// One inbound chat message, as delivered by the transport.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub owner_id: OwnerId,
    /// Display name as reported by the transport; may be absent.
    pub owner_name: Option<String>,
    pub text: String,
}

impl IncomingMessage {
    /// Display name with the `user_<id>` fallback for anonymous senders.
    pub fn owner_display_name(&self) -> String {
        self.owner_name
            .clone()
            .unwrap_or_else(|| format!("user_{}", self.owner_id))
    }
}

/// Recognized bot commands. Free text (wizard replies) parses to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Create,
    My,
    Events,
    Stats,
}

impl Command {
    /// Parse the leading command of a message, tolerating the `@botname`
    /// suffix Telegram appends in group chats. `/cancel` is deliberately
    /// not a command here: it is the wizard's cancel sentinel and flows
    /// through `submit` like any other wizard reply.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.trim().split_whitespace().next()?;
        let command = first.split('@').next().unwrap_or(first);
        match command {
            "/start" | "/help" => Some(Self::Start),
            "/create" => Some(Self::Create),
            "/my" => Some(Self::My),
            "/events" => Some(Self::Events),
            "/stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Start));
        assert_eq!(Command::parse("/create"), Some(Command::Create));
        assert_eq!(Command::parse("/my"), Some(Command::My));
        assert_eq!(Command::parse("/events"), Some(Command::Events));
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
    }

    #[test]
    fn test_strips_botname_suffix() {
        assert_eq!(Command::parse("/create@sanctuary_bot"), Some(Command::Create));
    }

    #[test]
    fn test_free_text_is_not_a_command() {
        assert_eq!(Command::parse("Glass"), None);
        assert_eq!(Command::parse("/cancel"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_display_name_falls_back_to_owner_id() {
        let message = IncomingMessage {
            owner_id: OwnerId::new(42),
            owner_name: None,
            text: "/start".to_string(),
        };
        assert_eq!(message.owner_display_name(), "user_42");

        let named = IncomingMessage {
            owner_name: Some("kafka".to_string()),
            ..message
        };
        assert_eq!(named.owner_display_name(), "kafka");
    }
}
