// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, Response},
};
use daily_goals_tracker::config::Config;
use daily_goals_tracker::db::{FirestoreDb, MemoryStore};
use daily_goals_tracker::middleware::auth::create_jwt;
use daily_goals_tracker::routes::create_router;
use daily_goals_tracker::services::MemoryAuthProvider;
use daily_goals_tracker::time_utils::FixedClock;
use daily_goals_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Everything a route test needs to poke at.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<MemoryAuthProvider>,
}

/// Create a test app on in-memory backends with "today" pinned to `clock`.
#[allow(dead_code)]
pub fn create_test_app_at(clock: FixedClock) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(MemoryAuthProvider::new());

    let state = Arc::new(AppState::new(
        Config::test_default(),
        store.clone(),
        auth.clone(),
        Arc::new(clock),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        auth,
    }
}

/// Create a test app pinned to 2024-01-15.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_at(FixedClock::ymd(2024, 1, 15))
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).unwrap()
}

/// Build a JSON request, optionally authenticated as `user_id`.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
