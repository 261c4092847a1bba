//! Event entity - a narrative moment in the sanctuary
//!
//! Events reference the pair of creatures they were rendered from. The
//! references are optional in the schema; the generator always fills both,
//! but a reference-free event stays representable.

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{CreatureId, EventId};

/// An immutable narrative event record.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub creature1_id: Option<CreatureId>,
    pub creature2_id: Option<CreatureId>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// An event about to be persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub creature1_id: Option<CreatureId>,
    pub creature2_id: Option<CreatureId>,
    pub text: String,
}
