// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{http::StatusCode, response::IntoResponse};
use daily_goals_tracker::error::AppError;

async fn status_and_body(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_auth_failures_map_to_user_messages() {
    let (status, body) = status_and_body(AppError::InvalidCredential).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credential");
    assert_eq!(
        body["details"],
        "Password or Email incorrect. Please try again."
    );

    let (status, body) = status_and_body(AppError::EmailInUse).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["details"],
        "This email is already in use. Please try a different one."
    );

    let (status, _) = status_and_body(AppError::AuthProvider("TOO_MANY_ATTEMPTS".into())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, body) =
        status_and_body(AppError::PasswordResetFailed("EMAIL_NOT_FOUND".into())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "auth_error");
    assert_eq!(
        body["details"],
        "Failed to send reset email. Please try again."
    );
}

#[tokio::test]
async fn test_store_failure_hides_internal_detail() {
    let (status, body) =
        status_and_body(AppError::StoreUnavailable("permission denied on users/u1".into())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "store_unavailable");
    assert!(!body["details"]
        .as_str()
        .unwrap()
        .contains("permission denied"));
}

#[tokio::test]
async fn test_unauthenticated_and_bad_request() {
    let (status, body) = status_and_body(AppError::Unauthenticated).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("details").is_none());

    let (status, body) = status_and_body(AppError::BadRequest("Invalid date".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Invalid date");
}
