// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No authenticated session when a write was attempted.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("Email address already in use")]
    EmailInUse,

    #[error("Auth provider error: {0}")]
    AuthProvider(String),

    #[error("Password reset failed: {0}")]
    PasswordResetFailed(String),

    /// Network or permission failure from the document store.
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Unauthenticated | AppError::InvalidToken => "Please log in to continue.",
            AppError::InvalidCredential => "Password or Email incorrect. Please try again.",
            AppError::EmailInUse => "This email is already in use. Please try a different one.",
            AppError::AuthProvider(_) => "An error occurred. Please try again.",
            AppError::PasswordResetFailed(_) => "Failed to send reset email. Please try again.",
            AppError::StoreUnavailable(_) => {
                "Failed to reach your saved data. Please try again later."
            }
            AppError::NotFound(_) => "Not found.",
            AppError::BadRequest(_) => "Invalid request.",
            AppError::Internal(_) => "An error occurred. Please try again.",
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::InvalidCredential => (
                StatusCode::UNAUTHORIZED,
                "invalid_credential",
                Some(self.user_message().to_string()),
            ),
            AppError::EmailInUse => (
                StatusCode::CONFLICT,
                "email_in_use",
                Some(self.user_message().to_string()),
            ),
            AppError::AuthProvider(msg) | AppError::PasswordResetFailed(msg) => {
                tracing::error!(error = %msg, "Auth provider error");
                (
                    StatusCode::BAD_GATEWAY,
                    "auth_error",
                    Some(self.user_message().to_string()),
                )
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!(error = %msg, "Document store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    Some(self.user_message().to_string()),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
