//! Value objects - Immutable objects defined by their attributes

mod ids;
mod vocabulary;

pub use ids::{CreatureId, EventId, OwnerId};
pub use vocabulary::{Vocabulary, VocabularyError, VocabularySet};
