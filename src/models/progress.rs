// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily goals and progress.
//!
//! Stored at: `users/{user_id}/goalsAndProgress/{YYYY-MM-DD}`
//!
//! Reads go through [`StoredProgress`], which keeps every leaf optional,
//! and are then hydrated into a complete [`ProgressRecord`] with zeros for
//! anything missing. Callers cannot tell a stored zero from a hole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::Document;

/// The user's daily targets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GoalSet {
    pub steps_goal: f64,
    pub calories_goal: f64,
    /// Litres
    pub water_goal: f64,
}

impl GoalSet {
    /// Goals shown before anything has been saved for today.
    pub const STARTER: GoalSet = GoalSet {
        steps_goal: 10000.0,
        calories_goal: 700.0,
        water_goal: 2.0,
    };
}

/// Recorded progress for one day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CurrentValues {
    pub steps: f64,
    pub calories: f64,
    /// Litres
    pub water: f64,
}

/// A fully populated progress document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressRecord {
    pub goals: GoalSet,
    pub current: CurrentValues,
    /// `YYYY-MM-DD`, empty when the stored document had no date
    pub date: String,
}

/// The fields written by a merge. `goals` is left out of the write when `None`.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<GoalSet>,
    pub current: CurrentValues,
    pub date: String,
}

/// Stored goals, leaf by leaf.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoredGoals {
    pub steps_goal: Option<f64>,
    pub calories_goal: Option<f64>,
    pub water_goal: Option<f64>,
}

/// Stored current values, leaf by leaf.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoredCurrent {
    pub steps: Option<f64>,
    pub calories: Option<f64>,
    pub water: Option<f64>,
}

/// A progress document as found in the store, possibly with holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredProgress {
    pub goals: Option<StoredGoals>,
    pub current: Option<StoredCurrent>,
    pub date: Option<String>,
}

fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

impl StoredProgress {
    /// Read whatever is usable out of a raw document.
    ///
    /// Values of the wrong shape (a string where a number belongs, a scalar
    /// where a map belongs) are treated as absent.
    pub fn from_document(doc: &Document) -> Self {
        let goals = doc
            .get("goals")
            .and_then(Value::as_object)
            .map(|g| StoredGoals {
                steps_goal: number(g, "stepsGoal"),
                calories_goal: number(g, "caloriesGoal"),
                water_goal: number(g, "waterGoal"),
            });
        let current = doc
            .get("current")
            .and_then(Value::as_object)
            .map(|c| StoredCurrent {
                steps: number(c, "steps"),
                calories: number(c, "calories"),
                water: number(c, "water"),
            });
        let date = doc.get("date").and_then(Value::as_str).map(str::to_string);

        Self {
            goals,
            current,
            date,
        }
    }

    /// Fill every hole with its default (0 for numbers, "" for the date).
    pub fn hydrate(self) -> ProgressRecord {
        let goals = self.goals.unwrap_or_default();
        let current = self.current.unwrap_or_default();

        ProgressRecord {
            goals: GoalSet {
                steps_goal: goals.steps_goal.unwrap_or(0.0),
                calories_goal: goals.calories_goal.unwrap_or(0.0),
                water_goal: goals.water_goal.unwrap_or(0.0),
            },
            current: CurrentValues {
                steps: current.steps.unwrap_or(0.0),
                calories: current.calories.unwrap_or(0.0),
                water: current.water.unwrap_or(0.0),
            },
            date: self.date.unwrap_or_default(),
        }
    }
}

/// Share of `goal` reached, as a whole percentage in `0..=100`.
///
/// A zero, negative, or non-finite goal yields 0.
pub fn percentage(current: f64, goal: f64) -> u32 {
    if !(goal > 0.0) || !goal.is_finite() || !current.is_finite() {
        return 0;
    }
    (current / goal * 100.0).round().clamp(0.0, 100.0) as u32
}
