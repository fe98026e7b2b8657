// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session middleware and cookie helpers.

use crate::config::Config;
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "goals_token";

/// Session lifetime in seconds (30 days).
const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID from the identity provider)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Pull the session token from the cookie, falling back to a Bearer header.
fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Validate a session token and return its user.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Option<AuthUser> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    let user_id = token_data.claims.sub;
    if user_id.trim().is_empty() {
        return None;
    }
    Some(AuthUser { user_id })
}

/// The session user for this request, if any (no rejection).
pub fn current_user(config: &Config, jar: &CookieJar, headers: &HeaderMap) -> Option<AuthUser> {
    session_token(jar, headers).and_then(|token| verify_jwt(&token, &config.jwt_signing_key))
}

/// Middleware that requires valid JWT authentication.
///
/// No token at all is `Unauthenticated`; a token that fails verification
/// is `InvalidToken`. Both are 401 with a JSON body.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, request.headers()).ok_or(AppError::Unauthenticated)?;
    let auth_user =
        verify_jwt(&token, &state.config.jwt_signing_key).ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Create a JWT for a user session.
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Session cookie carrying `token`.
pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

/// Removal cookie with the same attributes as [`session_cookie`].
pub fn session_cookie_removal(config: &Config) -> Cookie<'static> {
    let mut cookie = session_cookie(config, String::new());
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_round_trip() {
        let key = b"test_jwt_key_32_bytes_minimum!!";
        let token = create_jwt("u1", key).unwrap();
        let user = verify_jwt(&token, key).unwrap();
        assert_eq!(user.user_id, "u1");
    }

    #[test]
    fn test_jwt_wrong_key_rejected() {
        let token = create_jwt("u1", b"test_jwt_key_32_bytes_minimum!!").unwrap();
        assert!(verify_jwt(&token, b"another_key_that_is_long_enough").is_none());
    }

    #[test]
    fn test_jwt_blank_subject_rejected() {
        let key = b"test_jwt_key_32_bytes_minimum!!";
        let token = create_jwt("  ", key).unwrap();
        assert!(verify_jwt(&token, key).is_none());
    }

    #[test]
    fn test_bearer_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(
            session_token(&CookieJar::new(), &headers).as_deref(),
            Some("abc")
        );
    }
}
