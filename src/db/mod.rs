// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: a hierarchical document store with merge writes.
//!
//! Two backends implement [`DocumentStore`]: Firestore for production and
//! an in-process [`MemoryStore`] for tests and local development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Per-day progress documents (subcollection of a user, keyed by `YYYY-MM-DD`)
    pub const GOALS_AND_PROGRESS: &str = "goalsAndProgress";
}

/// A stored document: string keys to JSON-like values.
pub type Document = Map<String, Value>;

/// Slash-delimited path to a single document.
///
/// Always an even number of segments (`collection/id[/collection/id...]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Build a path from `collection, id, collection, id, ...` segments.
    pub fn new<I, S>(segments: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.len() % 2 != 0 {
            return Err(AppError::BadRequest(format!(
                "Document path needs collection/id pairs, got {} segments",
                segments.len()
            )));
        }
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || s.contains('/')) {
            return Err(AppError::BadRequest(format!(
                "Invalid document path segment: {:?}",
                bad
            )));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The collection and document ID of the final pair.
    pub fn leaf(&self) -> (&str, &str) {
        let n = self.segments.len();
        (&self.segments[n - 2], &self.segments[n - 1])
    }

    /// Segments of the parent document, empty for top-level documents.
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 2]
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Remote key-value document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document. `Ok(None)` when it does not exist.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, AppError>;

    /// Merge `patch` into the document, creating it if needed.
    ///
    /// Nested maps merge leaf by leaf; fields absent from `patch` are untouched.
    async fn set_merge(&self, path: &DocumentPath, patch: Document) -> Result<(), AppError>;
}

/// Deep-merge `patch` into `target`.
pub fn merge_into(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_into(existing, nested),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Dotted field paths of every leaf in `patch` (the update mask of a merge write).
///
/// An empty nested map counts as a leaf so that it is still written.
pub fn leaf_field_paths(patch: &Document) -> Vec<String> {
    fn walk(prefix: &str, doc: &Document, out: &mut Vec<String>) {
        for (key, value) in doc {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match value {
                Value::Object(nested) if !nested.is_empty() => walk(&path, nested, out),
                _ => out.push(path),
            }
        }
    }

    let mut out = Vec::new();
    walk("", patch, &mut out);
    out
}

/// Serialize a value into a top-level document.
pub fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "Expected a JSON object for a document, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_document_path_display_and_leaf() {
        let path = DocumentPath::new(["users", "u1", "goalsAndProgress", "2024-01-15"]).unwrap();
        assert_eq!(path.to_string(), "users/u1/goalsAndProgress/2024-01-15");
        assert_eq!(path.leaf(), ("goalsAndProgress", "2024-01-15"));
        assert_eq!(path.parent_segments(), ["users", "u1"]);
    }

    #[test]
    fn test_document_path_rejects_odd_or_empty_segments() {
        assert!(DocumentPath::new(["users"]).is_err());
        assert!(DocumentPath::new(["users", ""]).is_err());
        assert!(DocumentPath::new(["users", "a/b"]).is_err());
        assert!(DocumentPath::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_merge_into_keeps_untouched_siblings() {
        let mut target = doc(json!({
            "goals": {"stepsGoal": 10000, "waterGoal": 2.0},
            "current": {"steps": 10},
            "date": "2024-01-15"
        }));
        merge_into(
            &mut target,
            doc(json!({"current": {"steps": 5000, "water": 1.5}, "date": "2024-01-15"})),
        );

        assert_eq!(
            Value::Object(target),
            json!({
                "goals": {"stepsGoal": 10000, "waterGoal": 2.0},
                "current": {"steps": 5000, "water": 1.5},
                "date": "2024-01-15"
            })
        );
    }

    #[test]
    fn test_merge_into_replaces_scalar_with_map() {
        let mut target = doc(json!({"goals": 3}));
        merge_into(&mut target, doc(json!({"goals": {"stepsGoal": 1}})));
        assert_eq!(Value::Object(target), json!({"goals": {"stepsGoal": 1}}));
    }

    #[test]
    fn test_leaf_field_paths() {
        let patch = doc(json!({
            "current": {"steps": 1, "calories": 2},
            "date": "2024-01-15",
            "empty": {}
        }));
        let mut paths = leaf_field_paths(&patch);
        paths.sort();
        assert_eq!(
            paths,
            vec!["current.calories", "current.steps", "date", "empty"]
        );
    }
}
