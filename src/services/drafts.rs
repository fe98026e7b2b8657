// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unsaved edits to a day's goals and current values.
//!
//! Each (user, date) pair has one draft. Edits mark fields dirty; loading
//! from the store only replaces a draft that has no unsaved edits.

use crate::models::{CurrentValues, GoalSet, ProgressRecord};
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Metric {
    Steps,
    Calories,
    Water,
}

/// Which side of a metric an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Current,
    Goal,
}

/// One editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Field {
    pub metric: Metric,
    pub slot: Slot,
}

/// A day's working copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDraft {
    pub goals: GoalSet,
    pub current: CurrentValues,
    /// Fields edited since the last load or save.
    pub dirty: BTreeSet<Field>,
}

impl DayDraft {
    /// Starting state when nothing has been saved for the day.
    pub fn starter() -> Self {
        Self {
            goals: GoalSet::STARTER,
            current: CurrentValues::default(),
            dirty: BTreeSet::new(),
        }
    }

    fn from_record(record: &ProgressRecord) -> Self {
        Self {
            goals: record.goals,
            current: record.current,
            dirty: BTreeSet::new(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn set(&mut self, field: Field, value: f64) {
        let target = match (field.metric, field.slot) {
            (Metric::Steps, Slot::Current) => &mut self.current.steps,
            (Metric::Calories, Slot::Current) => &mut self.current.calories,
            (Metric::Water, Slot::Current) => &mut self.current.water,
            (Metric::Steps, Slot::Goal) => &mut self.goals.steps_goal,
            (Metric::Calories, Slot::Goal) => &mut self.goals.calories_goal,
            (Metric::Water, Slot::Goal) => &mut self.goals.water_goal,
        };
        *target = value;
        self.dirty.insert(field);
    }
}

/// Drafts keyed by (user, date).
#[derive(Default)]
pub struct DraftCache {
    drafts: DashMap<(String, NaiveDate), DayDraft>,
}

impl DraftCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install freshly loaded values, unless the draft holds unsaved edits.
    ///
    /// Returns the draft as it stands afterwards.
    pub fn seed(
        &self,
        user_id: &str,
        date: NaiveDate,
        loaded: Option<&ProgressRecord>,
    ) -> DayDraft {
        let mut entry = self
            .drafts
            .entry((user_id.to_string(), date))
            .or_insert_with(DayDraft::starter);
        if !entry.is_dirty() {
            *entry = loaded.map(DayDraft::from_record).unwrap_or_else(DayDraft::starter);
        }
        entry.clone()
    }

    /// Apply one field edit and return the updated draft.
    pub fn edit(&self, user_id: &str, date: NaiveDate, field: Field, value: f64) -> DayDraft {
        let mut entry = self
            .drafts
            .entry((user_id.to_string(), date))
            .or_insert_with(DayDraft::starter);
        entry.set(field, value);
        entry.clone()
    }

    pub fn get(&self, user_id: &str, date: NaiveDate) -> Option<DayDraft> {
        self.drafts
            .get(&(user_id.to_string(), date))
            .map(|d| d.clone())
    }

    /// Clear dirty flags after `saved` reached the store.
    ///
    /// Edits made while the save was in flight keep the draft dirty.
    pub fn mark_saved(&self, user_id: &str, date: NaiveDate, saved: &DayDraft) {
        if let Some(mut entry) = self.drafts.get_mut(&(user_id.to_string(), date)) {
            if entry.goals == saved.goals && entry.current == saved.current {
                entry.dirty.clear();
            }
        }
    }

    /// Drop all drafts older than `today` for every user.
    pub fn evict_before(&self, today: NaiveDate) {
        self.drafts.retain(|(_, date), _| *date >= today);
    }
}
