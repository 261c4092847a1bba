//! Sanctuary Engine - Backend for the Absurd Sanctuary creature bot
//!
//! The Engine is the backend process that:
//! - Stores creatures and events in SQLite
//! - Drives the three-step creature creation wizard over Telegram
//! - Periodically generates narrative events and broadcasts them
//! - Serves a small JSON status API

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::scheduler::EventScheduler;
use crate::infrastructure::state::AppState;
use crate::infrastructure::telegram::{run_polling, TelegramClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sanctuary_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sanctuary Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Database: {}", config.database_path);
    tracing::info!("  Event channel: {}", config.event_channel);
    tracing::info!("  Event interval: {}s", config.event_interval_secs);

    let telegram = Arc::new(TelegramClient::new(&config.bot_token));

    // Initialize application state
    let state = AppState::new(config, telegram.clone()).await?;
    let state = Arc::new(state);
    tracing::info!("Application state initialized");

    // Periodic event generation
    let scheduler = EventScheduler::new(
        Duration::from_secs(state.config.event_interval_secs),
        state.config.event_channel.clone(),
        state.event_service.clone(),
        telegram.clone(),
    );
    scheduler.start().await;

    // Inbound message long-polling
    let polling_worker = {
        let client = telegram.clone();
        let chat_service = state.chat_service.clone();
        tokio::spawn(async move {
            run_polling(client, chat_service).await;
        })
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping workers...");
            polling_worker.abort();
            scheduler.stop().await;
            tracing::info!("Workers stopped");
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
