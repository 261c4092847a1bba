//! Event scheduler - the periodic heartbeat of the sanctuary
//!
//! One repeating job: sleep the configured interval, ask the generator for
//! an event, broadcast it. A failed tick is logged and the next tick still
//! runs at the normal interval; the job only ends when the scheduler is
//! stopped.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::application::ports::outbound::ChatPort;
use crate::application::services::event_service::EventGenerationService;

/// Periodic driver for event generation.
pub struct EventScheduler {
    interval: Duration,
    channel: String,
    generator: Arc<dyn EventGenerationService>,
    chat: Arc<dyn ChatPort>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EventScheduler {
    pub fn new(
        interval: Duration,
        channel: String,
        generator: Arc<dyn EventGenerationService>,
        chat: Arc<dyn ChatPort>,
    ) -> Self {
        Self {
            interval,
            channel,
            generator,
            chat,
            worker: Mutex::new(None),
        }
    }

    /// Start the periodic job. Idempotent: a second start while the worker
    /// is alive is a no-op, so there is never more than one timer.
    pub async fn start(&self) {
        let mut worker = self.worker.lock().await;
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("event scheduler already running");
            return;
        }
        info!(
            interval_secs = self.interval.as_secs(),
            "event scheduler started"
        );

        let interval = self.interval;
        let channel = self.channel.clone();
        let generator = Arc::clone(&self.generator);
        let chat = Arc::clone(&self.chat);
        *worker = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                // Tick errors stop here; the loop re-arms at the normal
                // interval.
                if let Err(err) = run_tick(generator.as_ref(), chat.as_ref(), &channel).await {
                    error!("event scheduler tick failed: {err:#}");
                }
            }
        }));
    }

    /// Stop future ticks. Idempotent.
    pub async fn stop(&self) {
        if let Some(handle) = self.worker.lock().await.take() {
            handle.abort();
            info!("event scheduler stopped");
        }
    }

    /// Whether the periodic job is currently scheduled.
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// One tick: generate and broadcast, or skip quietly when the
    /// sanctuary holds fewer than two creatures.
    pub async fn tick(&self) -> Result<()> {
        run_tick(self.generator.as_ref(), self.chat.as_ref(), &self.channel).await
    }
}

async fn run_tick(
    generator: &dyn EventGenerationService,
    chat: &dyn ChatPort,
    channel: &str,
) -> Result<()> {
    let generated = generator
        .generate(None)
        .await
        .context("event generation failed")?;
    match generated {
        Some(event) => {
            chat.broadcast(channel, &event.text)
                .await
                .context("event broadcast failed")?;
            info!(event_id = %event.id, "broadcast scheduled event");
        }
        None => debug!("not enough creatures for a scheduled event"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::application::ports::outbound::{ChatError, StoreError};
    use crate::application::services::event_service::EventGenerationServiceImpl;
    use crate::domain::entities::{Event, NewCreature};
    use crate::domain::value_objects::{CreatureId, OwnerId};
    use crate::infrastructure::persistence::SqliteStore;

    #[derive(Default)]
    struct RecordingChat {
        broadcasts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatPort for RecordingChat {
        async fn reply(&self, _owner: OwnerId, _text: &str) -> Result<(), ChatError> {
            Ok(())
        }

        async fn broadcast(&self, channel: &str, text: &str) -> Result<(), ChatError> {
            self.broadcasts
                .lock()
                .await
                .push((channel.to_string(), text.to_string()));
            Ok(())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl EventGenerationService for FailingGenerator {
        async fn generate(
            &self,
            _pinned: Option<CreatureId>,
        ) -> Result<Option<Event>, StoreError> {
            Err(StoreError::Database("store is down".to_string()))
        }
    }

    fn new_creature(owner: i64) -> NewCreature {
        NewCreature {
            owner_id: OwnerId::new(owner),
            owner_name: format!("owner_{owner}"),
            material: "Glass".to_string(),
            behavior: "Drifts".to_string(),
            trait_: "Hums".to_string(),
        }
    }

    async fn scheduler_with_creatures(
        count: i64,
        interval: Duration,
    ) -> (Arc<EventScheduler>, Arc<RecordingChat>, Arc<SqliteStore>) {
        use crate::application::ports::outbound::CreatureRepositoryPort;

        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        for n in 0..count {
            store.insert_creature(new_creature(n)).await.unwrap();
        }
        let generator = Arc::new(EventGenerationServiceImpl::new(store.clone(), store.clone()));
        let chat = Arc::new(RecordingChat::default());
        let scheduler = Arc::new(EventScheduler::new(
            interval,
            "@sanctuary_events".to_string(),
            generator,
            chat.clone(),
        ));
        (scheduler, chat, store)
    }

    #[tokio::test]
    async fn test_tick_skips_quietly_when_underpopulated() {
        let (scheduler, chat, _store) =
            scheduler_with_creatures(1, Duration::from_secs(1800)).await;

        scheduler.tick().await.unwrap();
        assert!(chat.broadcasts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_tick_broadcasts_a_generated_event() {
        use crate::application::ports::outbound::EventRepositoryPort;

        let (scheduler, chat, store) =
            scheduler_with_creatures(2, Duration::from_secs(1800)).await;

        scheduler.tick().await.unwrap();

        let broadcasts = chat.broadcasts.lock().await;
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0].0, "@sanctuary_events");

        let events = store.list_recent_events(10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, broadcasts[0].1);
    }

    #[tokio::test]
    async fn test_tick_surfaces_generator_errors() {
        let chat = Arc::new(RecordingChat::default());
        let scheduler = EventScheduler::new(
            Duration::from_secs(1800),
            "@sanctuary_events".to_string(),
            Arc::new(FailingGenerator),
            chat.clone(),
        );

        assert!(scheduler.tick().await.is_err());
        assert!(chat.broadcasts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_ends_the_job() {
        let (scheduler, _chat, _store) =
            scheduler_with_creatures(0, Duration::from_secs(1800)).await;

        scheduler.start().await;
        scheduler.start().await;
        assert!(scheduler.is_running().await);

        scheduler.stop().await;
        assert!(!scheduler.is_running().await);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_ticks_fire_on_the_interval() {
        let (scheduler, chat, _store) =
            scheduler_with_creatures(2, Duration::from_secs(1800)).await;

        scheduler.start().await;

        // The paused clock auto-advances while we poll; two ticks are due
        // within the first hour and a bit of virtual time.
        let mut polls = 0u32;
        while chat.broadcasts.lock().await.len() < 2 {
            polls += 1;
            assert!(polls < 10_000, "scheduler never produced two ticks");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        scheduler.stop().await;
    }
}
