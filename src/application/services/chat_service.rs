//! Chat service - routes inbound messages and formats replies
//!
//! The transport delivers raw `(owner, name, text)` messages; everything
//! that decides what to do with them lives here. Commands map to store
//! lookups, anything else is fed to the wizard. Reply formatting keeps the
//! Markdown surface of the bot in one place.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::error;

use crate::application::dto::{Command, IncomingMessage};
use crate::application::ports::outbound::{
    ChatPort, CreatureRepositoryPort, EventRepositoryPort, StatsRepositoryPort, StoreStats,
};
use crate::application::services::conversation_service::{
    ConversationError, ConversationService, StepPrompt, SubmitOutcome, WizardStep,
};
use crate::domain::entities::{Creature, Event};

/// How many of an owner's creatures `/my` shows.
const MY_CREATURES_LIMIT: u32 = 10;
/// How many events `/events` shows.
const RECENT_EVENTS_LIMIT: u32 = 5;

/// Routes each inbound message to the wizard or a store view and sends
/// the formatted reply back through the chat port.
pub struct ChatService {
    conversation: Arc<dyn ConversationService>,
    creatures: Arc<dyn CreatureRepositoryPort>,
    events: Arc<dyn EventRepositoryPort>,
    stats: Arc<dyn StatsRepositoryPort>,
    chat: Arc<dyn ChatPort>,
    event_channel: String,
}

impl ChatService {
    pub fn new(
        conversation: Arc<dyn ConversationService>,
        creatures: Arc<dyn CreatureRepositoryPort>,
        events: Arc<dyn EventRepositoryPort>,
        stats: Arc<dyn StatsRepositoryPort>,
        chat: Arc<dyn ChatPort>,
        event_channel: String,
    ) -> Self {
        Self {
            conversation,
            creatures,
            events,
            stats,
            chat,
            event_channel,
        }
    }

    /// Handle one inbound message end to end.
    pub async fn handle(&self, message: IncomingMessage) -> Result<()> {
        let owner = message.owner_id;
        let reply = match Command::parse(&message.text) {
            Some(Command::Start) => self.welcome(),
            Some(Command::Create) => {
                let prompt = self
                    .conversation
                    .begin(owner, message.owner_display_name())
                    .await;
                render_prompt(&prompt)
            }
            Some(Command::My) => {
                let creatures = self.creatures.list_by_owner(owner, MY_CREATURES_LIMIT).await?;
                render_creature_list(&creatures)
            }
            Some(Command::Events) => {
                let events = self.events.list_recent_events(RECENT_EVENTS_LIMIT).await?;
                render_event_list(&events)
            }
            Some(Command::Stats) => {
                let stats = self.stats.aggregate_stats().await?;
                self.render_stats(&stats)
            }
            None => match self.conversation.submit(owner, &message.text).await {
                Ok(SubmitOutcome::Prompt(prompt)) => render_prompt(&prompt),
                Ok(SubmitOutcome::Cancelled) => "❎ Creature creation cancelled.".to_string(),
                Ok(SubmitOutcome::Completed(creature)) => render_completion(&creature),
                Err(ConversationError::InvalidSelection { step, .. }) => {
                    format!("❌ Pick a {step} from the list!")
                }
                Err(ConversationError::NoActiveConversation(_)) => {
                    "There is no creature in progress. Start one with /create.".to_string()
                }
                Err(ConversationError::Store(err)) => {
                    error!(%owner, "creature commit failed: {err}");
                    "⚠️ The sanctuary ledger is not responding. Your progress is kept, \
                     send that trait again in a moment."
                        .to_string()
                }
            },
        };

        self.chat
            .reply(owner, &reply)
            .await
            .context("failed to send reply")
    }

    fn welcome(&self) -> String {
        format!(
            "🐙 *Welcome to the Absurd Sanctuary!*\n\n\
             Here you create creatures out of nothing and watch them spawn chaos.\n\n\
             *Commands:*\n\
             /create — create a new creature\n\
             /my — your creatures\n\
             /events — latest sanctuary events\n\
             /stats — sanctuary statistics\n\n\
             *How it works:*\n\
             1. Assemble a creature from a Material, a Behavior and a Trait\n\
             2. The sanctuary periodically generates events with your creatures\n\
             3. Watch the channel: {}",
            self.event_channel
        )
    }

    fn render_stats(&self, stats: &StoreStats) -> String {
        let popular = match &stats.most_frequent_material {
            Some(m) => format!("{} ({})", m.material, m.count),
            None => "No data yet".to_string(),
        };
        format!(
            "📊 *Absurd Sanctuary statistics*\n\n\
             👥 *Owners:* {}\n\
             🦠 *Creatures:* {}\n\
             📜 *Events:* {}\n\
             🏆 *Popular material:* {}\n\n\
             📢 *Event channel:* {}",
            stats.total_owners,
            stats.total_creatures,
            stats.total_events,
            popular,
            self.event_channel
        )
    }
}

fn render_prompt(prompt: &StepPrompt) -> String {
    let heading = match prompt.step {
        WizardStep::Material => "Pick the creature's *MATERIAL*:",
        WizardStep::Behavior => "Pick the creature's *BEHAVIOR*:",
        WizardStep::Trait => "Pick the *SPECIAL TRAIT*:",
    };
    let mut text = format!("🎲 *STEP {}/3*: {heading}\n", prompt.step.ordinal());
    for option in &prompt.options {
        text.push_str(&format!("\n• {option}"));
    }
    text.push_str("\n\nSend /cancel to stop.");
    text
}

fn render_completion(creature: &Creature) -> String {
    format!(
        "✅ *Creature #{} created!*\n\n\
         🔮 *{}*\n\
         ⚡ *Trait:* {}\n\
         👤 *Creator:* @{}\n\
         🕐 *Created:* {}\n\n\
         It has settled into the sanctuary and will show up in events soon!",
        creature.id,
        creature.display_name(),
        creature.trait_,
        creature.owner_name,
        creature.created_at.format("%H:%M")
    )
}

fn render_creature_list(creatures: &[Creature]) -> String {
    if creatures.is_empty() {
        return "You have no creatures yet. Create the first one with /create".to_string();
    }
    let mut text = "🦠 *Your creatures:*\n".to_string();
    for creature in creatures {
        text.push_str(&format!(
            "\n*#{}*: {}\n   Trait: {}\n   Created: {}\n",
            creature.id,
            creature.display_name(),
            creature.trait_,
            creature.created_at.format("%H:%M")
        ));
    }
    text
}

fn render_event_list(events: &[Event]) -> String {
    if events.is_empty() {
        return "📭 The sanctuary is quiet... Too quiet.".to_string();
    }
    let mut text = "📜 *Latest sanctuary events:*\n".to_string();
    for event in events {
        text.push_str(&format!(
            "\n• {} *({})*\n",
            event.text,
            event.created_at.format("%H:%M")
        ));
    }
    text
}
