// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared-secret authentication for the control API.
//!
//! Every endpoint sits behind one policy: the `X-API-Key` header must equal
//! the configured token exactly. A mismatch short-circuits to a 401
//! envelope before any business logic runs.

use std::path::Path;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use warden_core::ApiEnvelope;

/// Compiled fallback used when the API key file is absent.
pub const DEFAULT_API_KEY: &str = "vpnwarden-dev-key-change-me";

/// Authentication configuration for the control API.
#[derive(Clone)]
pub struct AuthConfig {
    api_key: String,
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Loads the key from the given file, trimmed, falling back to the
    /// compiled default when the file is missing or unreadable.
    pub fn from_key_file(path: impl AsRef<Path>) -> Self {
        Self {
            api_key: load_api_key(path),
        }
    }

    fn matches(&self, presented: Option<&str>) -> bool {
        presented == Some(self.api_key.as_str())
    }
}

/// Reads the shared API key file, trimmed, falling back to the compiled
/// default when the file is missing or unreadable. Both the server and the
/// in-process clients read the key this way.
pub fn load_api_key(path: impl AsRef<Path>) -> String {
    match std::fs::read_to_string(path.as_ref()) {
        Ok(raw) => raw.trim().to_string(),
        Err(e) => {
            tracing::warn!(
                path = %path.as_ref().display(),
                error = %e,
                "api key file unreadable, using compiled default"
            );
            DEFAULT_API_KEY.to_string()
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &"[redacted]")
            .finish()
    }
}

/// Middleware validating the `X-API-Key` header by exact string equality.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    if auth.matches(presented) {
        return next.run(request).await;
    }

    let envelope: ApiEnvelope<()> = ApiEnvelope {
        success: false,
        message: "unauthorized".to_string(),
        data: None,
    };
    (StatusCode::UNAUTHORIZED, Json(envelope)).into_response()
}
