// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

/// Which store and identity provider the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Firestore + Firebase Identity Toolkit.
    Firebase,
    /// In-process store and identity provider (local development).
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firebase" | "firestore" => Ok(Backend::Firebase),
            "memory" => Ok(Backend::Memory),
            other => Err(ConfigError::Invalid("BACKEND", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store/identity backend
    pub backend: Backend,
    /// Firebase Web API key (Identity Toolkit)
    pub firebase_api_key: Option<String>,
    /// GCP project ID hosting Firestore
    pub gcp_project_id: String,
    /// Frontend URL (CORS origin, cookie security)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let backend = match env::var("BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => Backend::Firebase,
        };

        let firebase_api_key = env::var("FIREBASE_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if backend == Backend::Firebase && firebase_api_key.is_none() {
            return Err(ConfigError::Missing("FIREBASE_API_KEY"));
        }

        Ok(Self {
            backend,
            firebase_api_key,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests: memory backend, localhost frontend.
    pub fn test_default() -> Self {
        Self {
            backend: Backend::Memory,
            firebase_api_key: None,
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        !(self.frontend_url.starts_with("http://localhost")
            || self.frontend_url.starts_with("http://127.0.0.1"))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
