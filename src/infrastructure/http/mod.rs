//! HTTP status API routes

mod status_routes;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

pub use status_routes::*;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stats", get(status_routes::get_stats))
        .route("/api/events", get(status_routes::list_events))
}
