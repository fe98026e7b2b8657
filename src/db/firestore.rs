// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`DocumentStore`].
//!
//! Paths map onto Firestore as `parent path + collection + document ID`.
//! Merge writes use an update mask of the patch's leaf field paths, so
//! fields outside the patch are never touched.

use super::{leaf_field_paths, Document, DocumentPath, DocumentStore};
use crate::error::AppError;
use async_trait::async_trait;
use firestore::ParentPathBuilder;
use serde_json::Value;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

fn store_err(e: impl std::fmt::Display) -> AppError {
    AppError::StoreUnavailable(e.to_string())
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| store_err(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| store_err(format!("Failed to connect to Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| store_err("Database not connected (offline mode)"))
    }

    /// Resolve the parent document of `path`, `None` for top-level documents.
    fn parent_of(
        client: &firestore::FirestoreDb,
        path: &DocumentPath,
    ) -> Result<Option<ParentPathBuilder>, AppError> {
        let parent = path.parent_segments();
        if parent.is_empty() {
            return Ok(None);
        }

        let mut builder = client
            .parent_path(&parent[0], parent[1].as_str())
            .map_err(store_err)?;
        for pair in parent[2..].chunks(2) {
            builder = builder
                .at(&pair[0], pair[1].as_str())
                .map_err(store_err)?;
        }
        Ok(Some(builder))
    }
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, AppError> {
        let client = self.get_client()?;
        let (collection, doc_id) = path.leaf();

        let value: Option<Value> = match Self::parent_of(client, path)? {
            Some(parent) => {
                client
                    .fluent()
                    .select()
                    .by_id_in(collection)
                    .parent(&parent)
                    .obj()
                    .one(doc_id)
                    .await
            }
            None => {
                client
                    .fluent()
                    .select()
                    .by_id_in(collection)
                    .obj()
                    .one(doc_id)
                    .await
            }
        }
        .map_err(|e| {
            tracing::warn!(path = %path, error = %e, "Firestore read failed");
            store_err(e)
        })?;

        match value {
            Some(Value::Object(doc)) => Ok(Some(doc)),
            Some(other) => Err(store_err(format!(
                "Document at {} is not a map: {}",
                path, other
            ))),
            None => Ok(None),
        }
    }

    async fn set_merge(&self, path: &DocumentPath, patch: Document) -> Result<(), AppError> {
        let client = self.get_client()?;
        let (collection, doc_id) = path.leaf();
        let mask = leaf_field_paths(&patch);
        let object = Value::Object(patch);

        let result: firestore::FirestoreResult<()> = match Self::parent_of(client, path)? {
            Some(parent) => {
                client
                    .fluent()
                    .update()
                    .fields(mask)
                    .in_col(collection)
                    .document_id(doc_id)
                    .parent(&parent)
                    .object(&object)
                    .execute()
                    .await
            }
            None => {
                client
                    .fluent()
                    .update()
                    .fields(mask)
                    .in_col(collection)
                    .document_id(doc_id)
                    .object(&object)
                    .execute()
                    .await
            }
        };

        result.map_err(|e| {
            tracing::warn!(path = %path, error = %e, "Firestore merge write failed");
            store_err(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_offline_client_reports_store_unavailable() {
        let db = FirestoreDb::new_mock();
        let path = DocumentPath::new(["users", "u1", "goalsAndProgress", "2024-01-15"]).unwrap();

        assert!(matches!(
            db.get(&path).await,
            Err(AppError::StoreUnavailable(_))
        ));

        let patch = json!({"date": "2024-01-15"}).as_object().unwrap().clone();
        assert!(matches!(
            db.set_merge(&path, patch).await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}
