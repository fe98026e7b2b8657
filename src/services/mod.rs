// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod drafts;
pub mod identity;
pub mod profile;
pub mod progress;

pub use drafts::{DayDraft, DraftCache, Field, Metric, Slot};
pub use identity::{AuthIdentity, AuthProvider, IdentityToolkitClient, MemoryAuthProvider};
pub use profile::ProfileAccessor;
pub use progress::{derive_document_path, ProgressRepository};
