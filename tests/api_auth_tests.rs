// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Protected routes accept requests with valid tokens (header or cookie)
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(common::json_request("GET", "/api/progress/today", None, None))
        .await
        .unwrap();

    // Should return 401 Unauthorized without token
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body_json(response).await["error"], "unauthenticated");
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(common::json_request(
            "GET",
            "/api/progress/today",
            Some("invalid.token.here"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::body_json(response).await["error"], "invalid_token");
}

#[tokio::test]
async fn test_token_signed_with_other_key_rejected() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("u1", b"some_other_signing_key_32_bytes!");

    let response = app
        .router
        .oneshot(common::json_request(
            "PUT",
            "/api/progress/today",
            Some(&token),
            Some(serde_json::json!({
                "goals": {"stepsGoal": 1, "caloriesGoal": 1, "waterGoal": 1},
                "current": {"steps": 1, "calories": 1, "water": 1}
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.store.is_empty(), "Rejected write must not reach the store");
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("u1", &app.state.config.jwt_signing_key);

    let response = app
        .router
        .oneshot(common::json_request(
            "GET",
            "/api/progress/today",
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_with_session_cookie() {
    let app = common::create_test_app();
    let token = common::create_test_jwt("u1", &app.state.config.jwt_signing_key);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/progress/yesterday")
                .header(header::COOKIE, format!("goals_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = common::create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/progress/today")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    // Should have CORS headers
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));

    // A host that only starts with "localhost" is someone else's site
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/progress/today")
                .header(header::ORIGIN, "http://localhost.attacker.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(common::json_request("GET", "/health", None, None))
        .await
        .unwrap();

    // Health should be accessible without auth
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
}
