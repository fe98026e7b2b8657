// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily Goals Tracker API Server
//!
//! Serves daily goals and progress for authenticated users, backed by
//! Firestore and Firebase Auth (or in-memory stand-ins for local runs).

use daily_goals_tracker::{
    config::{Backend, Config},
    db::{DocumentStore, FirestoreDb, MemoryStore},
    services::{AuthProvider, IdentityToolkitClient, MemoryAuthProvider},
    time_utils::SystemClock,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, backend = ?config.backend, "Starting Daily Goals Tracker API");

    let (store, auth): (Arc<dyn DocumentStore>, Arc<dyn AuthProvider>) = match config.backend {
        Backend::Firebase => {
            let db = FirestoreDb::new(&config.gcp_project_id).await?;
            let api_key = config.firebase_api_key.clone().unwrap_or_default();
            (Arc::new(db), Arc::new(IdentityToolkitClient::new(api_key)))
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory store and identity provider; data is lost on exit");
            (
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryAuthProvider::new()),
            )
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        auth,
        Arc::new(SystemClock),
    ));

    // Build router
    let app = daily_goals_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("daily_goals_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
