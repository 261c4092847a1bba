//! Creature entity - an inhabitant of the sanctuary
//!
//! A creature is assembled from one value of each attribute vocabulary plus
//! the identity of the owner who created it. Creatures are immutable once
//! committed; the store assigns the id and the constructor stamps the
//! creation time.

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{CreatureId, OwnerId};

/// An immutable creature record.
#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    pub id: CreatureId,
    pub owner_id: OwnerId,
    pub owner_name: String,
    pub material: String,
    pub behavior: String,
    pub trait_: String,
    pub created_at: DateTime<Utc>,
}

impl Creature {
    /// Display name in the "<Material> <behavior...>" form used across the
    /// reply surface, e.g. "Glass feeds on postponed tasks".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.material, self.behavior.to_lowercase())
    }
}

/// Attributes of a creature about to be committed; the store turns this
/// into a full [`Creature`] by assigning the id.
#[derive(Debug, Clone)]
pub struct NewCreature {
    pub owner_id: OwnerId,
    pub owner_name: String,
    pub material: String,
    pub behavior: String,
    pub trait_: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_lowercases_behavior() {
        let creature = Creature {
            id: CreatureId::new(1),
            owner_id: OwnerId::new(42),
            owner_name: "tester".to_string(),
            material: "Glass".to_string(),
            behavior: "Feeds on postponed tasks".to_string(),
            trait_: "Has built-in sarcasm".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(creature.display_name(), "Glass feeds on postponed tasks");
    }
}
