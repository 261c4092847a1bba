//! Application configuration

use std::env;

use anyhow::{bail, Context, Result};

use crate::domain::value_objects::{Vocabulary, VocabularySet};

const DEFAULT_MATERIALS: &[&str] = &[
    "Glass",
    "Bureaucracy",
    "Dust",
    "Nostalgia",
    "Unfinished code",
    "Rubber bands",
    "Missed profit",
    "Cryptocurrency",
];

const DEFAULT_BEHAVIORS: &[&str] = &[
    "Feeds on postponed tasks",
    "Breeds by filing paperwork",
    "Migrates after typos",
    "Hibernates in the browser cache",
    "Hunts unanswered emails",
];

const DEFAULT_TRAITS: &[&str] = &[
    "Hypnotic pattern of 404 errors",
    "Constantly loses its paperwork",
    "Smells of missed profit",
    "Has built-in sarcasm",
    "Multiplies when deleted",
    "Requires approval from three departments",
];

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot token
    pub bot_token: String,
    /// Channel the scheduler broadcasts events to (e.g. `@sanctuary_events`)
    pub event_channel: String,
    /// SQLite database file path
    pub database_path: String,
    /// Seconds between scheduled event-generation ticks
    pub event_interval_secs: u64,
    /// Status API port
    pub server_port: u16,
    /// Attribute vocabularies creatures are built from
    pub vocabularies: VocabularySet,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let event_interval_secs: u64 = env::var("EVENT_INTERVAL")
            .unwrap_or_else(|_| "1800".to_string())
            .parse()
            .context("EVENT_INTERVAL must be a number of seconds")?;
        if event_interval_secs == 0 {
            bail!("EVENT_INTERVAL must be strictly positive");
        }

        Ok(Self {
            bot_token: env::var("BOT_TOKEN").context("BOT_TOKEN environment variable is required")?,
            event_channel: env::var("EVENT_CHANNEL")
                .context("EVENT_CHANNEL environment variable is required")?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "sanctuary.db".to_string()),
            event_interval_secs,
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            vocabularies: load_vocabularies()?,
        })
    }
}

fn load_vocabularies() -> Result<VocabularySet> {
    Ok(VocabularySet {
        materials: vocabulary_from_env("MATERIALS", "materials", DEFAULT_MATERIALS)?,
        behaviors: vocabulary_from_env("BEHAVIORS", "behaviors", DEFAULT_BEHAVIORS)?,
        traits: vocabulary_from_env("TRAITS", "traits", DEFAULT_TRAITS)?,
    })
}

/// Build one vocabulary from a comma-separated env override, or from the
/// built-in defaults when the variable is unset.
fn vocabulary_from_env(var: &str, name: &'static str, defaults: &[&str]) -> Result<Vocabulary> {
    let vocabulary = match env::var(var) {
        Ok(raw) => Vocabulary::new(
            name,
            raw.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>(),
        ),
        Err(_) => Vocabulary::new(name, defaults.iter().copied()),
    };
    vocabulary.with_context(|| format!("invalid {var} vocabulary"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabularies_are_valid() {
        let set = load_vocabularies().unwrap();
        assert_eq!(set.materials.len(), DEFAULT_MATERIALS.len());
        assert_eq!(set.behaviors.len(), DEFAULT_BEHAVIORS.len());
        assert_eq!(set.traits.len(), DEFAULT_TRAITS.len());
        assert!(set.materials.contains("Glass"));
    }
}
