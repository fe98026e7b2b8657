// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progress repository: date-keyed goals/progress documents.
//!
//! Every write is a merge into `users/{user_id}/goalsAndProgress/{date}`,
//! and the `date` field inside the document is always derived from the same
//! calendar date as the key. Reads hydrate partial documents with zeros.

use crate::db::{collections, to_document, DocumentPath, DocumentStore};
use crate::error::AppError;
use crate::models::{CurrentValues, GoalSet, ProgressPatch, ProgressRecord, StoredProgress};
use crate::time_utils::{date_key, Clock};
use chrono::NaiveDate;
use std::sync::Arc;

/// Derive the document path for a user's progress on `date`.
pub fn derive_document_path(user_id: &str, date: NaiveDate) -> Result<DocumentPath, AppError> {
    DocumentPath::new([
        collections::USERS.to_string(),
        user_id.to_string(),
        collections::GOALS_AND_PROGRESS.to_string(),
        date_key(date),
    ])
}

/// A user ID that can key a document: non-blank and free of path separators.
pub(crate) fn session_user(user_id: &str) -> Option<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads and merge-writes daily progress documents.
#[derive(Clone)]
pub struct ProgressRepository {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ProgressRepository {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Today's calendar date on the local clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Merge goals and current values into today's document.
    pub async fn save_goals_and_current(
        &self,
        user_id: &str,
        goals: GoalSet,
        current: CurrentValues,
    ) -> Result<(), AppError> {
        let user_id = session_user(user_id).ok_or(AppError::Unauthenticated)?;
        let date = self.clock.today();

        self.merge(
            user_id,
            date,
            ProgressPatch {
                goals: Some(goals),
                current,
                date: date_key(date),
            },
        )
        .await?;

        tracing::info!(user_id, date = %date, "Saved goals and current values");
        Ok(())
    }

    /// Merge current values into the document for `date`, leaving its goals untouched.
    pub async fn save_current_for_date(
        &self,
        user_id: &str,
        current: CurrentValues,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        let user_id = session_user(user_id).ok_or(AppError::Unauthenticated)?;

        self.merge(
            user_id,
            date,
            ProgressPatch {
                goals: None,
                current,
                date: date_key(date),
            },
        )
        .await?;

        tracing::info!(user_id, date = %date, "Saved current values");
        Ok(())
    }

    /// Load the record for `date`. `Ok(None)` when nothing was ever saved that day.
    pub async fn load_progress(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<ProgressRecord>, AppError> {
        let Some(user_id) = session_user(user_id) else {
            tracing::debug!("No session user, nothing to load");
            return Ok(None);
        };

        let path = derive_document_path(user_id, date)?;
        let stored = self
            .store
            .get(&path)
            .await?
            .map(|doc| StoredProgress::from_document(&doc));

        if stored.is_none() {
            tracing::debug!(path = %path, "No progress document");
        }
        Ok(stored.map(StoredProgress::hydrate))
    }

    pub async fn load_today(&self, user_id: &str) -> Result<Option<ProgressRecord>, AppError> {
        self.load_progress(user_id, self.clock.today()).await
    }

    pub async fn load_yesterday(&self, user_id: &str) -> Result<Option<ProgressRecord>, AppError> {
        self.load_progress(user_id, self.clock.yesterday()).await
    }

    async fn merge(
        &self,
        user_id: &str,
        date: NaiveDate,
        patch: ProgressPatch,
    ) -> Result<(), AppError> {
        let path = derive_document_path(user_id, date)?;
        self.store.set_merge(&path, to_document(&patch)?).await
    }
}
