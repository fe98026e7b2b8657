// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, current_user, session_cookie, session_cookie_removal};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/password-reset", post(password_reset))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

/// Sign-up form. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all fields."))]
    pub username: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Please fill in all fields."),
        email(message = "Please enter a valid email address.")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all fields."))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SignupResponse {
    pub user_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user_id: Option<String>,
}

/// First validation message, preferring the "fill in all fields" check.
fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .collect();
    messages.sort_by_key(|m| !m.starts_with("Please fill"));
    messages
        .into_iter()
        .next()
        .unwrap_or_else(|| "Invalid sign-up form".to_string())
}

/// Create an account and its profile. Does not start a session.
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    form.validate()
        .map_err(|e| AppError::BadRequest(first_validation_message(&e)))?;

    let identity = state.auth.sign_up(form.email.trim(), &form.password).await?;

    state
        .profiles
        .create_profile(&identity.user_id, form.username.trim(), &identity.email)
        .await?;

    tracing::info!(user_id = %identity.user_id, "Signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: identity.user_id,
        }),
    ))
}

/// Sign in and set the session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter both email and password.".to_string(),
        ));
    }

    let identity = state
        .auth
        .sign_in_with_password(form.email.trim(), &form.password)
        .await?;

    let jwt = create_jwt(&identity.user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = %identity.user_id, "Signed in");

    Ok((
        jar.add(session_cookie(&state.config, jwt)),
        Json(SessionResponse {
            authenticated: true,
            user_id: Some(identity.user_id),
        }),
    ))
}

async fn password_reset(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PasswordResetRequest>,
) -> Result<StatusCode> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter your email to reset your password.".to_string(),
        ));
    }

    state
        .auth
        .send_password_reset(email)
        .await
        .map_err(|e| match e {
            AppError::AuthProvider(msg) => AppError::PasswordResetFailed(msg),
            other => other,
        })?;
    tracing::info!("Password reset email requested");
    Ok(StatusCode::NO_CONTENT)
}

/// Sign out: drop the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.add(session_cookie_removal(&state.config)),
        StatusCode::NO_CONTENT,
    )
}

/// Whether the request carries a valid session.
async fn session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let user = current_user(&state.config, &jar, &headers);
    Json(SessionResponse {
        authenticated: user.is_some(),
        user_id: user.map(|u| u.user_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_signup_validation_requires_all_fields() {
        let errors = form("", "", "").validate().unwrap_err();
        assert_eq!(first_validation_message(&errors), "Please fill in all fields.");
    }

    #[test]
    fn test_signup_validation_rejects_bad_email() {
        let errors = form("sam", "not-an-email", "hunter22")
            .validate()
            .unwrap_err();
        assert_eq!(
            first_validation_message(&errors),
            "Please enter a valid email address."
        );
    }

    #[test]
    fn test_signup_validation_accepts_good_form() {
        assert!(form("sam", "sam@example.com", "hunter22").validate().is_ok());
    }
}
