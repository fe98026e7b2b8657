// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod progress;
pub mod user;

pub use progress::{
    percentage, CurrentValues, GoalSet, ProgressPatch, ProgressRecord, StoredProgress,
};
pub use user::UserProfile;
