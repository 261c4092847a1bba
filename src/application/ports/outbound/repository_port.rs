//! Repository ports - Interfaces for data persistence
//!
//! These traits define the contracts that the store implementation must
//! fulfil. Application services depend on these traits, not on the concrete
//! SQLite adapter, which keeps the wizard and the generator testable against
//! doubles (including deliberately failing stores).

use async_trait::async_trait;

use crate::domain::entities::{Creature, Event, NewCreature, NewEvent};
use crate::domain::value_objects::{CreatureId, OwnerId};

/// Store read/write failure. Everything persistence-related surfaces as
/// this one recoverable error; callers decide whether to retry or report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

/// Count of creatures sharing the most frequent material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialCount {
    pub material: String,
    pub count: i64,
}

/// Advisory aggregate statistics over the whole store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub total_creatures: i64,
    pub total_owners: i64,
    pub total_events: i64,
    /// Most frequent material; ties broken by first insertion. `None` when
    /// the store holds no creatures.
    pub most_frequent_material: Option<MaterialCount>,
}

/// Repository port for Creature operations
#[async_trait]
pub trait CreatureRepositoryPort: Send + Sync {
    /// Commit a new creature; the store assigns the id and timestamp.
    async fn insert_creature(&self, new: NewCreature) -> Result<Creature, StoreError>;

    /// Get a creature by id.
    async fn get_creature(&self, id: CreatureId) -> Result<Option<Creature>, StoreError>;

    /// List an owner's creatures, newest first.
    async fn list_by_owner(&self, owner: OwnerId, limit: u32) -> Result<Vec<Creature>, StoreError>;

    /// Up to `n` creatures chosen uniformly at random without replacement.
    /// Returns fewer than `n` when the store holds fewer creatures; an
    /// undersized store is never an error.
    async fn sample_random(&self, n: usize) -> Result<Vec<Creature>, StoreError>;

    /// Same as [`sample_random`](Self::sample_random), excluding one id.
    async fn sample_random_excluding(
        &self,
        n: usize,
        exclude: CreatureId,
    ) -> Result<Vec<Creature>, StoreError>;
}

/// Repository port for Event operations
#[async_trait]
pub trait EventRepositoryPort: Send + Sync {
    /// Persist a new event; the store assigns the id and timestamp.
    async fn insert_event(&self, new: NewEvent) -> Result<Event, StoreError>;

    /// List the most recent events, newest first.
    async fn list_recent_events(&self, limit: u32) -> Result<Vec<Event>, StoreError>;
}

/// Repository port for aggregate statistics
#[async_trait]
pub trait StatsRepositoryPort: Send + Sync {
    /// Aggregate counts over the whole store. Idempotent between writes.
    async fn aggregate_stats(&self) -> Result<StoreStats, StoreError>;
}
