// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily Goals Tracker: steps, calories and water, one day at a time.
//!
//! This crate provides the backend API: users sign in, set daily goals,
//! record progress, and look back at yesterday. Goals and progress are
//! stored per calendar day in a document store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{AuthProvider, DraftCache, ProfileAccessor, ProgressRepository};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: Arc<dyn AuthProvider>,
    pub progress: ProgressRepository,
    pub profiles: ProfileAccessor,
    pub drafts: DraftCache,
}

impl AppState {
    /// Wire the repositories onto one store and clock.
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            auth,
            progress: ProgressRepository::new(store.clone(), clock.clone()),
            profiles: ProfileAccessor::new(store, clock),
            drafts: DraftCache::new(),
        }
    }
}
