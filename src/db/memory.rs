// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store with the same merge semantics as Firestore.

use super::{merge_into, Document, DocumentPath, DocumentStore};
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Document store held in memory, keyed by full path.
#[derive(Default)]
pub struct MemoryStore {
    docs: DashMap<String, Document>,
    /// Paths that fail every read and write (simulated outages).
    failing: DashSet<String>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `path` fail with `StoreUnavailable`.
    pub fn fail_path(&self, path: &DocumentPath) {
        self.failing.insert(path.to_string());
    }

    /// Undo [`MemoryStore::fail_path`].
    pub fn heal_path(&self, path: &DocumentPath) {
        self.failing.remove(&path.to_string());
    }

    /// Replace a document wholesale, bypassing merge semantics (test fixtures).
    pub fn put_raw(&self, path: &DocumentPath, doc: Document) {
        self.docs.insert(path.to_string(), doc);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Successful `set_merge` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn check(&self, path: &DocumentPath) -> Result<String, AppError> {
        let key = path.to_string();
        if self.failing.contains(&key) {
            return Err(AppError::StoreUnavailable(format!(
                "Simulated outage for {}",
                key
            )));
        }
        Ok(key)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, AppError> {
        let key = self.check(path)?;
        Ok(self.docs.get(&key).map(|doc| doc.value().clone()))
    }

    async fn set_merge(&self, path: &DocumentPath, patch: Document) -> Result<(), AppError> {
        let key = self.check(path)?;
        merge_into(&mut self.docs.entry(key).or_default(), patch);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
