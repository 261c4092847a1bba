//! SQLite store - the durable record of creatures and events
//!
//! Single source of truth for the sanctuary. All operations are atomic at
//! single-row granularity; the conversation wizard and the event scheduler
//! share one pool without further coordination. Random sampling is computed
//! here in Rust over the fetched id set rather than delegated to the
//! storage engine's random ordering, so the distribution does not depend on
//! engine behavior.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::application::ports::outbound::{
    CreatureRepositoryPort, EventRepositoryPort, MaterialCount, StatsRepositoryPort, StoreError,
    StoreStats,
};
use crate::domain::entities::{Creature, Event, NewCreature, NewEvent};
use crate::domain::value_objects::{CreatureId, EventId, OwnerId};

use async_trait::async_trait;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// SQLite-backed store for creatures and events.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path` and ensure the
    /// schema exists.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Database(e.to_string()))?;
            }
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite:{path}"))?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        Self::init_schema(&pool).await?;
        tracing::info!("connected to SQLite store: {}", path);
        Ok(Self { pool })
    }

    /// In-memory store, used by tests. A single connection keeps every
    /// query on the same in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS creatures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                owner_name TEXT NOT NULL,
                material TEXT NOT NULL,
                behavior TEXT NOT NULL,
                trait TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                creature1_id INTEGER REFERENCES creatures(id),
                creature2_id INTEGER REFERENCES creatures(id),
                event_text TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_creatures_owner ON creatures (owner_id, id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn fetch_creatures_by_ids(&self, ids: &[i64]) -> Result<Vec<Creature>, StoreError> {
        let mut creatures = Vec::with_capacity(ids.len());
        for &id in ids {
            let row = sqlx::query(
                "SELECT id, owner_id, owner_name, material, behavior, trait, created_at
                 FROM creatures WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(row) = row {
                creatures.push(row_to_creature(&row)?);
            }
        }
        Ok(creatures)
    }

    /// Uniform sample without replacement over an id set, computed in Rust.
    fn sample_ids(ids: &[i64], n: usize) -> Vec<i64> {
        if ids.len() <= n {
            return ids.to_vec();
        }
        let mut rng = rand::thread_rng();
        rand::seq::index::sample(&mut rng, ids.len(), n)
            .iter()
            .map(|i| ids[i])
            .collect()
    }
}

fn row_to_creature(row: &SqliteRow) -> Result<Creature, StoreError> {
    Ok(Creature {
        id: CreatureId::new(row.try_get("id")?),
        owner_id: OwnerId::new(row.try_get("owner_id")?),
        owner_name: row.try_get("owner_name")?,
        material: row.try_get("material")?,
        behavior: row.try_get("behavior")?,
        trait_: row.try_get("trait")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn row_to_event(row: &SqliteRow) -> Result<Event, StoreError> {
    let creature1: Option<i64> = row.try_get("creature1_id")?;
    let creature2: Option<i64> = row.try_get("creature2_id")?;
    Ok(Event {
        id: EventId::new(row.try_get("id")?),
        creature1_id: creature1.map(CreatureId::new),
        creature2_id: creature2.map(CreatureId::new),
        text: row.try_get("event_text")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl CreatureRepositoryPort for SqliteStore {
    async fn insert_creature(&self, new: NewCreature) -> Result<Creature, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO creatures (owner_id, owner_name, material, behavior, trait, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(new.owner_id.as_i64())
        .bind(&new.owner_name)
        .bind(&new.material)
        .bind(&new.behavior)
        .bind(&new.trait_)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let creature = Creature {
            id: CreatureId::new(result.last_insert_rowid()),
            owner_id: new.owner_id,
            owner_name: new.owner_name,
            material: new.material,
            behavior: new.behavior,
            trait_: new.trait_,
            created_at,
        };
        tracing::debug!(creature_id = %creature.id, "inserted creature");
        Ok(creature)
    }

    async fn get_creature(&self, id: CreatureId) -> Result<Option<Creature>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_id, owner_name, material, behavior, trait, created_at
             FROM creatures WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_creature).transpose()
    }

    async fn list_by_owner(&self, owner: OwnerId, limit: u32) -> Result<Vec<Creature>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, owner_name, material, behavior, trait, created_at
             FROM creatures WHERE owner_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(owner.as_i64())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_creature).collect()
    }

    async fn sample_random(&self, n: usize) -> Result<Vec<Creature>, StoreError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM creatures")
            .fetch_all(&self.pool)
            .await?;
        let chosen = Self::sample_ids(&ids, n);
        self.fetch_creatures_by_ids(&chosen).await
    }

    async fn sample_random_excluding(
        &self,
        n: usize,
        exclude: CreatureId,
    ) -> Result<Vec<Creature>, StoreError> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM creatures WHERE id != ?")
            .bind(exclude.as_i64())
            .fetch_all(&self.pool)
            .await?;
        let chosen = Self::sample_ids(&ids, n);
        self.fetch_creatures_by_ids(&chosen).await
    }
}

#[async_trait]
impl EventRepositoryPort for SqliteStore {
    async fn insert_event(&self, new: NewEvent) -> Result<Event, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO events (creature1_id, creature2_id, event_text, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(new.creature1_id.map(CreatureId::as_i64))
        .bind(new.creature2_id.map(CreatureId::as_i64))
        .bind(&new.text)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let event = Event {
            id: EventId::new(result.last_insert_rowid()),
            creature1_id: new.creature1_id,
            creature2_id: new.creature2_id,
            text: new.text,
            created_at,
        };
        tracing::debug!(event_id = %event.id, "inserted event");
        Ok(event)
    }

    async fn list_recent_events(&self, limit: u32) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, creature1_id, creature2_id, event_text, created_at
             FROM events ORDER BY id DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_event).collect()
    }
}

#[async_trait]
impl StatsRepositoryPort for SqliteStore {
    async fn aggregate_stats(&self) -> Result<StoreStats, StoreError> {
        let total_creatures: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM creatures")
            .fetch_one(&self.pool)
            .await?;
        let total_owners: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT owner_id) FROM creatures")
            .fetch_one(&self.pool)
            .await?;
        let total_events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        // Ties on frequency go to the material whose first creature was
        // inserted earliest.
        let most_frequent_material = sqlx::query(
            "SELECT material, COUNT(*) AS cnt, MIN(id) AS first_id
             FROM creatures GROUP BY material
             ORDER BY cnt DESC, first_id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?
        .map(|row| -> Result<MaterialCount, StoreError> {
            Ok(MaterialCount {
                material: row.try_get("material")?,
                count: row.try_get("cnt")?,
            })
        })
        .transpose()?;

        Ok(StoreStats {
            total_creatures,
            total_owners,
            total_events,
            most_frequent_material,
        })
    }
}
