//! Event generation service - narrative events from creature pairs
//!
//! Picks two distinct creatures (uniformly at random, or one pinned plus a
//! random partner), renders one template variant chosen uniformly from the
//! closed catalog, and persists the result. Too few creatures is a normal
//! `None`, never an error; the sanctuary simply stays quiet.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

use crate::application::ports::outbound::{
    CreatureRepositoryPort, EventRepositoryPort, StoreError,
};
use crate::domain::entities::{Creature, Event, NewEvent};
use crate::domain::value_objects::CreatureId;

/// One narrative template. Each variant is a pure function from a creature
/// pair to text; the catalog is configuration, not control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTemplate {
    Encounter,
    Conflict,
    Symbiosis,
    Mutation,
    Evolution,
    Violation,
}

impl EventTemplate {
    pub const ALL: [EventTemplate; 6] = [
        EventTemplate::Encounter,
        EventTemplate::Conflict,
        EventTemplate::Symbiosis,
        EventTemplate::Mutation,
        EventTemplate::Evolution,
        EventTemplate::Violation,
    ];

    /// Render this template for a pair of distinct creatures.
    pub fn render(&self, first: &Creature, second: &Creature) -> String {
        match self {
            Self::Encounter => format!(
                "🔄 *Encounter*: {} met {}...",
                first.display_name(),
                second.display_name()
            ),
            Self::Conflict => format!(
                "💥 *Conflict*: '{}' clashed with '{}'!",
                first.trait_, second.trait_
            ),
            Self::Symbiosis => format!(
                "🤝 *Symbiosis*: {} and {} formed an unstable alliance.",
                first.material, second.material
            ),
            Self::Mutation => format!(
                "🌀 *Mutation*: under the influence of '{}', {} developed a new trait.",
                second.behavior.to_lowercase(),
                first.material
            ),
            Self::Evolution => format!(
                "📈 *Evolution*: {} and {} created a hybrid of absurdity.",
                first.owner_name, second.owner_name
            ),
            Self::Violation => format!(
                "⚠️ *Violation*: {} broke the sanctuary rules.",
                first.display_name()
            ),
        }
    }
}

/// Event generation service trait
#[async_trait]
pub trait EventGenerationService: Send + Sync {
    /// Generate, persist and return one event, or `None` when fewer than
    /// two distinct creatures exist.
    async fn generate(&self, pinned: Option<CreatureId>) -> Result<Option<Event>, StoreError>;
}

/// Production event generator backed by the store.
pub struct EventGenerationServiceImpl {
    creatures: Arc<dyn CreatureRepositoryPort>,
    events: Arc<dyn EventRepositoryPort>,
}

impl EventGenerationServiceImpl {
    pub fn new(
        creatures: Arc<dyn CreatureRepositoryPort>,
        events: Arc<dyn EventRepositoryPort>,
    ) -> Self {
        Self { creatures, events }
    }

    /// Two distinct creatures: the pinned one plus a random partner when a
    /// resolvable pin is given, two uniformly random ones otherwise.
    async fn select_pair(
        &self,
        pinned: Option<CreatureId>,
    ) -> Result<Option<(Creature, Creature)>, StoreError> {
        if let Some(id) = pinned {
            if let Some(first) = self.creatures.get_creature(id).await? {
                let mut partners = self.creatures.sample_random_excluding(1, id).await?;
                return match partners.pop() {
                    Some(second) => Ok(Some((first, second))),
                    // The pinned creature is the only one in the store.
                    None => Ok(None),
                };
            }
            debug!(%id, "pinned creature not found, falling back to a random pair");
        }

        let mut pair = self.creatures.sample_random(2).await?;
        let Some(second) = pair.pop() else {
            return Ok(None);
        };
        let Some(first) = pair.pop() else {
            return Ok(None);
        };
        Ok(Some((first, second)))
    }
}

#[async_trait]
impl EventGenerationService for EventGenerationServiceImpl {
    async fn generate(&self, pinned: Option<CreatureId>) -> Result<Option<Event>, StoreError> {
        let Some((first, second)) = self.select_pair(pinned).await? else {
            debug!("not enough creatures for an event");
            return Ok(None);
        };

        let template = {
            let mut rng = rand::thread_rng();
            EventTemplate::ALL[rng.gen_range(0..EventTemplate::ALL.len())]
        };
        let text = template.render(&first, &second);

        let event = self
            .events
            .insert_event(NewEvent {
                creature1_id: Some(first.id),
                creature2_id: Some(second.id),
                text,
            })
            .await?;

        info!(event_id = %event.id, ?template, "event generated");
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewCreature;
    use crate::domain::value_objects::OwnerId;
    use crate::infrastructure::persistence::SqliteStore;

    fn sample_creature(n: i64) -> NewCreature {
        NewCreature {
            owner_id: OwnerId::new(n),
            owner_name: format!("owner_{n}"),
            material: format!("Material {n}"),
            behavior: format!("Behavior {n}"),
            trait_: format!("Trait {n}"),
        }
    }

    async fn service_with_creatures(count: i64) -> (EventGenerationServiceImpl, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        for n in 0..count {
            store.insert_creature(sample_creature(n)).await.unwrap();
        }
        let service = EventGenerationServiceImpl::new(store.clone(), store.clone());
        (service, store)
    }

    #[tokio::test]
    async fn test_no_event_below_two_creatures() {
        let (service, _store) = service_with_creatures(0).await;
        assert_eq!(service.generate(None).await.unwrap(), None);

        let (service, _store) = service_with_creatures(1).await;
        assert_eq!(service.generate(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_two_creatures_yield_an_event_referencing_both() {
        let (service, store) = service_with_creatures(2).await;

        let event = service.generate(None).await.unwrap().expect("an event");
        let mut refs = [event.creature1_id, event.creature2_id];
        refs.sort();
        assert_eq!(
            refs.map(|r| r.map(CreatureId::as_i64)),
            [Some(1), Some(2)],
            "the event must reference both creatures, in either order"
        );
        assert!(!event.text.is_empty());

        let recent = store.list_recent_events(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, event.id);
    }

    #[tokio::test]
    async fn test_references_are_never_equal() {
        let (service, _store) = service_with_creatures(3).await;

        for _ in 0..20 {
            let event = service.generate(None).await.unwrap().expect("an event");
            assert_ne!(event.creature1_id, event.creature2_id);
        }
    }

    #[tokio::test]
    async fn test_pinned_creature_is_paired_with_a_distinct_partner() {
        let (service, store) = service_with_creatures(3).await;
        let pinned = store.sample_random(3).await.unwrap()[0].id;

        for _ in 0..10 {
            let event = service.generate(Some(pinned)).await.unwrap().expect("an event");
            assert_eq!(event.creature1_id, Some(pinned));
            assert_ne!(event.creature2_id, Some(pinned));
        }
    }

    #[tokio::test]
    async fn test_unresolvable_pin_falls_back_to_a_random_pair() {
        let (service, _store) = service_with_creatures(2).await;

        let event = service
            .generate(Some(CreatureId::new(999)))
            .await
            .unwrap()
            .expect("an event");
        assert_ne!(event.creature1_id, event.creature2_id);
    }

    #[tokio::test]
    async fn test_pin_with_no_partner_yields_none() {
        let (service, store) = service_with_creatures(1).await;
        let only = store.sample_random(1).await.unwrap()[0].id;

        assert_eq!(service.generate(Some(only)).await.unwrap(), None);
    }

    #[test]
    fn test_templates_render_the_fields_they_reference() {
        let first = Creature {
            id: CreatureId::new(1),
            owner_id: OwnerId::new(1),
            owner_name: "ada".to_string(),
            material: "Glass".to_string(),
            behavior: "Drifts".to_string(),
            trait_: "Hums".to_string(),
            created_at: chrono::Utc::now(),
        };
        let second = Creature {
            id: CreatureId::new(2),
            owner_id: OwnerId::new(2),
            owner_name: "kurt".to_string(),
            material: "Dust".to_string(),
            behavior: "Hunts unanswered emails".to_string(),
            trait_: "Multiplies when deleted".to_string(),
            created_at: chrono::Utc::now(),
        };

        let encounter = EventTemplate::Encounter.render(&first, &second);
        assert!(encounter.contains("Glass drifts"));
        assert!(encounter.contains("Dust hunts unanswered emails"));

        let conflict = EventTemplate::Conflict.render(&first, &second);
        assert!(conflict.contains("Hums"));
        assert!(conflict.contains("Multiplies when deleted"));

        let symbiosis = EventTemplate::Symbiosis.render(&first, &second);
        assert!(symbiosis.contains("Glass") && symbiosis.contains("Dust"));

        let mutation = EventTemplate::Mutation.render(&first, &second);
        assert!(mutation.contains("hunts unanswered emails"));
        assert!(mutation.contains("Glass"));

        let evolution = EventTemplate::Evolution.render(&first, &second);
        assert!(evolution.contains("ada") && evolution.contains("kurt"));

        let violation = EventTemplate::Violation.render(&first, &second);
        assert!(violation.contains("Glass drifts"));
    }
}
