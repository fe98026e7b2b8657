// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{percentage, CurrentValues, GoalSet, ProgressRecord};
use crate::services::{DayDraft, Field, Metric, Slot};
use crate::time_utils::{date_key, parse_date_key};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const TODAY_LOAD_FAILED: &str = "Failed to load your goals. Please try again later.";
const YESTERDAY_LOAD_FAILED: &str = "Failed to load yesterday's progress. Please try again later.";

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/draft", patch(edit_draft))
        .route("/api/draft/save", post(save_draft))
        .route(
            "/api/progress/today",
            get(get_today_progress).put(save_today_progress),
        )
        .route("/api/progress/yesterday", get(get_yesterday_progress))
        .route("/api/progress/{date}", get(get_progress_for_date))
        .route("/api/progress/{date}/current", put(save_current_for_date))
}

fn parse_date_param(raw: &str) -> Result<NaiveDate> {
    parse_date_key(raw).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid date '{}': expected YYYY-MM-DD", raw))
    })
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .profiles
        .read_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserResponse {
        user_id: user.user_id,
        username: profile.username,
        email: profile.email,
        created_at: profile.created_at,
    }))
}

// ─── Progress Records ────────────────────────────────────────

async fn get_today_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Option<ProgressRecord>>> {
    Ok(Json(state.progress.load_today(&user.user_id).await?))
}

async fn get_yesterday_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Option<ProgressRecord>>> {
    Ok(Json(state.progress.load_yesterday(&user.user_id).await?))
}

async fn get_progress_for_date(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<Option<ProgressRecord>>> {
    let date = parse_date_param(&date)?;
    Ok(Json(state.progress.load_progress(&user.user_id, date).await?))
}

#[derive(Debug, Deserialize)]
pub struct SaveProgressRequest {
    pub goals: GoalSet,
    pub current: CurrentValues,
}

#[derive(Debug, Deserialize)]
pub struct SaveCurrentRequest {
    pub current: CurrentValues,
}

async fn save_today_progress(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SaveProgressRequest>,
) -> Result<StatusCode> {
    state
        .progress
        .save_goals_and_current(&user.user_id, body.goals, body.current)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn save_current_for_date(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(body): Json<SaveCurrentRequest>,
) -> Result<StatusCode> {
    let date = parse_date_param(&date)?;
    state
        .progress
        .save_current_for_date(&user.user_id, body.current, date)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Dashboard ───────────────────────────────────────────────

/// One progress bar: "{current} / {goal} {unit}" plus fill width.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgressBarView {
    pub metric: Metric,
    pub title: String,
    pub unit: String,
    pub current: f64,
    pub goal: f64,
    pub label: String,
    /// Bar width, 0..=100
    pub percent: u32,
}

impl ProgressBarView {
    fn new(metric: Metric, title: &str, current: f64, goal: f64) -> Self {
        let unit = match metric {
            Metric::Steps => "steps",
            Metric::Calories => "kcal",
            Metric::Water => "L",
        };
        Self {
            metric,
            title: title.to_string(),
            unit: unit.to_string(),
            current,
            goal,
            label: format!("{} / {} {}", current, goal, unit),
            percent: percentage(current, goal),
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DayView {
    pub date: String,
    pub bars: Vec<ProgressBarView>,
}

impl DayView {
    /// Today's editable bars.
    fn today(date: NaiveDate, draft: &DayDraft) -> Self {
        Self {
            date: date_key(date),
            bars: vec![
                ProgressBarView::new(
                    Metric::Steps,
                    "Steps Today",
                    draft.current.steps,
                    draft.goals.steps_goal,
                ),
                ProgressBarView::new(
                    Metric::Calories,
                    "Calories Burned",
                    draft.current.calories,
                    draft.goals.calories_goal,
                ),
                ProgressBarView::new(
                    Metric::Water,
                    "Water Intake",
                    draft.current.water,
                    draft.goals.water_goal,
                ),
            ],
        }
    }

    /// A past day, against that day's own goals.
    ///
    /// Differs from the web dashboard, which drew yesterday's values against
    /// today's goals.
    fn past(record: &ProgressRecord) -> Self {
        Self {
            date: record.date.clone(),
            bars: vec![
                ProgressBarView::new(
                    Metric::Steps,
                    "Steps",
                    record.current.steps,
                    record.goals.steps_goal,
                ),
                ProgressBarView::new(
                    Metric::Calories,
                    "Calories",
                    record.current.calories,
                    record.goals.calories_goal,
                ),
                ProgressBarView::new(
                    Metric::Water,
                    "Water",
                    record.current.water,
                    record.goals.water_goal,
                ),
            ],
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    pub username: Option<String>,
    pub today: DayView,
    /// Today's draft has edits not yet saved
    pub unsaved_changes: bool,
    /// `None` when nothing was recorded yesterday (or it failed to load)
    pub yesterday: Option<DayView>,
    /// User-facing messages for loads that failed
    pub errors: Vec<String>,
}

/// Load today, yesterday and the username independently.
///
/// A failed load only drops its own section and adds a message to `errors`.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let user_id = user.user_id.as_str();
    let today = state.progress.today();
    state.drafts.evict_before(today);

    let (today_result, yesterday_result, username_result) = tokio::join!(
        state.progress.load_progress(user_id, today),
        state.progress.load_yesterday(user_id),
        state.profiles.read_username(user_id),
    );

    let mut errors = Vec::new();

    let draft = match today_result {
        Ok(record) => state.drafts.seed(user_id, today, record.as_ref()),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to load today's progress");
            errors.push(TODAY_LOAD_FAILED.to_string());
            state
                .drafts
                .get(user_id, today)
                .unwrap_or_else(DayDraft::starter)
        }
    };

    let yesterday = match yesterday_result {
        Ok(record) => record.as_ref().map(DayView::past),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to load yesterday's progress");
            errors.push(YESTERDAY_LOAD_FAILED.to_string());
            None
        }
    };

    let username = username_result.unwrap_or_else(|e| {
        tracing::warn!(user_id, error = %e, "Failed to load username");
        None
    });

    Ok(Json(DashboardResponse {
        username,
        today: DayView::today(today, &draft),
        unsaved_changes: draft.is_dirty(),
        yesterday,
        errors,
    }))
}

// ─── Draft Editing ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditDraftRequest {
    pub metric: Metric,
    pub slot: Slot,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub today: DayView,
    pub unsaved_changes: bool,
    pub dirty: Vec<Field>,
}

impl DraftResponse {
    fn new(date: NaiveDate, draft: &DayDraft) -> Self {
        Self {
            today: DayView::today(date, draft),
            unsaved_changes: draft.is_dirty(),
            dirty: draft.dirty.iter().copied().collect(),
        }
    }
}

/// The cached draft for `today`, seeded from the store when there is none yet.
async fn today_draft(state: &AppState, user_id: &str, today: NaiveDate) -> Result<DayDraft> {
    if let Some(draft) = state.drafts.get(user_id, today) {
        return Ok(draft);
    }
    let loaded = state.progress.load_progress(user_id, today).await?;
    Ok(state.drafts.seed(user_id, today, loaded.as_ref()))
}

/// Change one field of today's draft. Nothing is written to the store.
async fn edit_draft(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<EditDraftRequest>,
) -> Result<Json<DraftResponse>> {
    if !body.value.is_finite() {
        return Err(AppError::BadRequest("Value must be a number".to_string()));
    }

    let today = state.progress.today();
    today_draft(&state, &user.user_id, today).await?;

    let field = Field {
        metric: body.metric,
        slot: body.slot,
    };
    let draft = state.drafts.edit(&user.user_id, today, field, body.value);

    Ok(Json(DraftResponse::new(today, &draft)))
}

/// Save all three goals and all three current values for today in one write.
async fn save_draft(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DraftResponse>> {
    let user_id = user.user_id.as_str();
    let today = state.progress.today();

    let draft = today_draft(&state, user_id, today).await?;

    state
        .progress
        .save_goals_and_current(user_id, draft.goals, draft.current)
        .await?;
    state.drafts.mark_saved(user_id, today, &draft);

    let current = state.drafts.get(user_id, today).unwrap_or(draft);
    Ok(Json(DraftResponse::new(today, &current)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_label_and_percent() {
        let bar = ProgressBarView::new(Metric::Steps, "Steps Today", 5000.0, 10000.0);
        assert_eq!(bar.label, "5000 / 10000 steps");
        assert_eq!(bar.percent, 50);
    }

    #[test]
    fn test_bar_fractional_water() {
        let bar = ProgressBarView::new(Metric::Water, "Water Intake", 1.5, 2.0);
        assert_eq!(bar.label, "1.5 / 2 L");
        assert_eq!(bar.percent, 75);
    }

    #[test]
    fn test_bar_zero_goal() {
        let bar = ProgressBarView::new(Metric::Calories, "Calories", 300.0, 0.0);
        assert_eq!(bar.label, "300 / 0 kcal");
        assert_eq!(bar.percent, 0);
    }

    #[test]
    fn test_parse_date_param() {
        assert!(parse_date_param("2024-01-15").is_ok());
        assert!(matches!(
            parse_date_param("15-01-2024"),
            Err(AppError::BadRequest(_))
        ));
    }
}
