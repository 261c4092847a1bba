//! Status API routes - read-only JSON views over the store

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::ports::outbound::{
    EventRepositoryPort, MaterialCount, StatsRepositoryPort, StoreStats,
};
use crate::domain::entities::Event;
use crate::infrastructure::state::AppState;

const DEFAULT_EVENTS_LIMIT: u32 = 20;
const MAX_EVENTS_LIMIT: u32 = 100;

#[derive(Debug, Serialize)]
pub struct MaterialCountResponse {
    pub material: String,
    pub count: i64,
}

impl From<MaterialCount> for MaterialCountResponse {
    fn from(m: MaterialCount) -> Self {
        Self {
            material: m.material,
            count: m.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_creatures: i64,
    pub total_owners: i64,
    pub total_events: i64,
    pub most_frequent_material: Option<MaterialCountResponse>,
}

impl From<StoreStats> for StatsResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            total_creatures: stats.total_creatures,
            total_owners: stats.total_owners,
            total_events: stats.total_events,
            most_frequent_material: stats.most_frequent_material.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub creature1_id: Option<i64>,
    pub creature2_id: Option<i64>,
    pub text: String,
    pub created_at: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.as_i64(),
            creature1_id: event.creature1_id.map(|id| id.as_i64()),
            creature2_id: event.creature2_id.map(|id| id.as_i64()),
            text: event.text,
            created_at: event.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<u32>,
}

/// Aggregate sanctuary statistics
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let stats = state
        .store
        .aggregate_stats()
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(stats.into()))
}

/// Most recent events, newest first
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventResponse>>, (StatusCode, String)> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_EVENTS_LIMIT)
        .min(MAX_EVENTS_LIMIT);

    let events = state
        .store
        .list_recent_events(limit)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}
