// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed client for the control API wire contract.
//!
//! The Telegram front-end and the background workers both go through this
//! client, exercising exactly the code paths a remote operator would. The
//! envelope is decoded once here into typed per-operation results; nothing
//! downstream re-inspects untyped maps.

use std::time::Duration;

use serde::de::DeserializeOwned;
use warden_core::{
    ApiEnvelope, CreateResult, RenewResult, SystemInfo, UserEntry, UserRequest, WardenError,
};

/// Fixed timeout for every control API call.
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the authenticated control API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the API rooted at `base_url` (e.g.
    /// `http://127.0.0.1:8080/api`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: reqwest::Client::builder()
                .timeout(API_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    pub async fn create(&self, req: &UserRequest) -> Result<CreateResult, WardenError> {
        self.post("/user/create", req).await
    }

    pub async fn renew(&self, req: &UserRequest) -> Result<RenewResult, WardenError> {
        self.post("/user/renew", req).await
    }

    pub async fn delete(&self, secret: &str) -> Result<(), WardenError> {
        let req = UserRequest::secret_only(secret);
        let _: serde_json::Value = self.post("/user/delete", &req).await.or_else(|err| {
            // Delete has no payload; an envelope without data is success.
            match err {
                WardenError::Upstream { ref message, .. } if message == MISSING_PAYLOAD => {
                    Ok(serde_json::Value::Null)
                }
                other => Err(other),
            }
        })?;
        Ok(())
    }

    pub async fn users(&self) -> Result<Vec<UserEntry>, WardenError> {
        self.get("/users").await
    }

    pub async fn info(&self) -> Result<SystemInfo, WardenError> {
        self.get("/info").await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &UserRequest,
    ) -> Result<T, WardenError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("X-API-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, WardenError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        decode(response).await
    }
}

const MISSING_PAYLOAD: &str = "control API response carried no payload";

fn transport_error(e: reqwest::Error) -> WardenError {
    let message = if e.is_timeout() {
        "control API timed out".to_string()
    } else {
        format!("control API unreachable: {e}")
    };
    WardenError::Upstream {
        message,
        source: Some(Box::new(e)),
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, WardenError> {
    // Error statuses still carry the envelope; decode it either way.
    let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| WardenError::Upstream {
        message: format!("failed to decode control API response: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !envelope.success {
        return Err(WardenError::upstream(envelope.message));
    }
    envelope.data.ok_or_else(|| WardenError::upstream(MISSING_PAYLOAD))
}
