// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password identity providers.
//!
//! Handles:
//! - Sign-in and sign-up against Firebase Identity Toolkit
//! - Password reset emails
//! - An in-process provider for tests and local development
//!
//! Sign-out and the session-present check live in the session layer
//! (see `middleware::auth`), not here.

use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Mutex;

/// Minimum password length accepted by Firebase Auth.
const MIN_PASSWORD_LEN: usize = 6;

/// A successfully authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Stable user identifier (document key under `users/`)
    pub user_id: String,
    pub email: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthIdentity, AppError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError>;
}

// ─── Firebase Identity Toolkit ───────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'a str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map an Identity Toolkit error message (e.g. `"WEAK_PASSWORD : Password should be..."`).
pub fn map_identity_error(message: &str) -> AppError {
    let code = message.split(" : ").next().unwrap_or(message).trim();
    match code {
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            AppError::InvalidCredential
        }
        "EMAIL_EXISTS" => AppError::EmailInUse,
        _ => AppError::AuthProvider(message.to_string()),
    }
}

/// Firebase Identity Toolkit REST client.
#[derive(Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityToolkitClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://identitytoolkit.googleapis.com/v1".to_string())
    }

    /// Point at another endpoint (e.g. the Auth emulator).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn post<B: Serialize + Sync, T: serde::de::DeserializeOwned + Send>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = format!("{}/accounts:{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::AuthProvider(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, text));
            tracing::warn!(method, status = %status, message = %message, "Identity Toolkit error");
            return Err(map_identity_error(&message));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::AuthProvider(format!("Invalid {} response: {}", method, e)))
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthIdentity, AppError> {
        let account: AccountResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        Ok(AuthIdentity {
            user_id: account.local_id,
            email: account.email.unwrap_or_else(|| email.to_string()),
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError> {
        let account: AccountResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!(user_id = %account.local_id, "Account created");
        Ok(AuthIdentity {
            user_id: account.local_id,
            email: account.email.unwrap_or_else(|| email.to_string()),
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await
            .map_err(|e| match e {
                // Unknown email during reset is still a failed reset, not a bad login
                AppError::InvalidCredential => AppError::AuthProvider("EMAIL_NOT_FOUND".into()),
                other => other,
            })?;
        Ok(())
    }
}

// ─── In-memory provider ──────────────────────────────────────

struct Account {
    user_id: String,
    email: String,
    password_hash: String,
}

fn hash_password(user_id: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Accounts held in memory, keyed by lowercased email.
#[derive(Default)]
pub struct MemoryAuthProvider {
    accounts: DashMap<String, Account>,
    resets: Mutex<Vec<String>>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails a password reset was sent to, oldest first.
    pub fn reset_requests(&self) -> Vec<String> {
        self.resets.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthIdentity, AppError> {
        let account = self
            .accounts
            .get(&email.trim().to_lowercase())
            .ok_or(AppError::InvalidCredential)?;

        if account.password_hash != hash_password(&account.user_id, password) {
            return Err(AppError::InvalidCredential);
        }
        Ok(AuthIdentity {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthIdentity, AppError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::AuthProvider("WEAK_PASSWORD".to_string()));
        }

        let key = email.trim().to_lowercase();
        let entry = match self.accounts.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(AppError::EmailInUse),
            dashmap::mapref::entry::Entry::Vacant(entry) => entry,
        };

        // 28 hex chars, the same length as a Firebase uid
        let user_id = hex::encode(Sha256::digest(key.as_bytes()))[..28].to_string();
        entry.insert(Account {
            user_id: user_id.clone(),
            email: email.trim().to_string(),
            password_hash: hash_password(&user_id, password),
        });

        Ok(AuthIdentity {
            user_id,
            email: email.trim().to_string(),
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AppError> {
        let key = email.trim().to_lowercase();
        if !self.accounts.contains_key(&key) {
            return Err(AppError::AuthProvider("EMAIL_NOT_FOUND".to_string()));
        }
        if let Ok(mut resets) = self.resets.lock() {
            resets.push(key);
        }
        Ok(())
    }
}
