// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile documents at `users/{user_id}`.

use crate::db::{collections, DocumentPath, DocumentStore};
use crate::error::AppError;
use crate::models::UserProfile;
use crate::services::progress::session_user;
use crate::time_utils::{format_utc_rfc3339, Clock};
use serde_json::Value;
use std::sync::Arc;

fn profile_path(user_id: &str) -> Result<DocumentPath, AppError> {
    DocumentPath::new([collections::USERS, user_id])
}

#[derive(Clone)]
pub struct ProfileAccessor {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl ProfileAccessor {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Merge-write the profile. `createdAt` is only set the first time.
    pub async fn create_profile(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> Result<(), AppError> {
        let user_id = session_user(user_id).ok_or(AppError::Unauthenticated)?;
        let path = profile_path(user_id)?;

        let mut patch = serde_json::Map::new();
        patch.insert("username".to_string(), Value::from(username));
        patch.insert("email".to_string(), Value::from(email));

        let has_created_at = self
            .store
            .get(&path)
            .await?
            .is_some_and(|doc| doc.get("createdAt").is_some_and(Value::is_string));
        if !has_created_at {
            patch.insert(
                "createdAt".to_string(),
                Value::from(format_utc_rfc3339(self.clock.now_utc())),
            );
        }

        self.store.set_merge(&path, patch).await?;
        tracing::info!(user_id, "User profile saved");
        Ok(())
    }

    pub async fn read_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        let Some(user_id) = session_user(user_id) else {
            return Ok(None);
        };
        let Some(doc) = self.store.get(&profile_path(user_id)?).await? else {
            tracing::debug!(user_id, "No user profile found");
            return Ok(None);
        };

        let text = |key: &str| {
            doc.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Some(UserProfile {
            username: text("username"),
            email: text("email"),
            created_at: text("createdAt"),
        }))
    }

    /// The stored username, if the profile exists and has one.
    pub async fn read_username(&self, user_id: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .read_profile(user_id)
            .await?
            .map(|profile| profile.username)
            .filter(|name| !name.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::time_utils::FixedClock;

    fn accessor(store: Arc<MemoryStore>, clock: FixedClock) -> ProfileAccessor {
        ProfileAccessor::new(store, Arc::new(clock))
    }

    #[tokio::test]
    async fn test_create_and_read_profile() {
        let profiles = accessor(Arc::new(MemoryStore::new()), FixedClock::ymd(2024, 1, 15));

        profiles
            .create_profile("u1", "alex", "alex@example.com")
            .await
            .unwrap();

        let profile = profiles.read_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.username, "alex");
        assert_eq!(profile.email, "alex@example.com");
        assert_eq!(profile.created_at, "2024-01-15T12:00:00Z");
        assert_eq!(
            profiles.read_username("u1").await.unwrap().as_deref(),
            Some("alex")
        );
    }

    #[tokio::test]
    async fn test_create_profile_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        accessor(store.clone(), FixedClock::ymd(2024, 1, 15))
            .create_profile("u1", "alex", "alex@example.com")
            .await
            .unwrap();

        let later = accessor(store, FixedClock::ymd(2024, 6, 1));
        later
            .create_profile("u1", "alex", "alex@example.com")
            .await
            .unwrap();

        let profile = later.read_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.created_at, "2024-01-15T12:00:00Z");
    }

    #[tokio::test]
    async fn test_read_username_missing_profile() {
        let profiles = accessor(Arc::new(MemoryStore::new()), FixedClock::ymd(2024, 1, 15));
        assert_eq!(profiles.read_username("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_profile_requires_session() {
        let profiles = accessor(Arc::new(MemoryStore::new()), FixedClock::ymd(2024, 1, 15));
        let err = profiles
            .create_profile("", "alex", "alex@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }
}
