// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the control API.
//!
//! Every response uses the uniform `{success, message, data}` envelope;
//! status codes are advisory and mirror the error taxonomy (400 validation,
//! 401 auth, 404 not-found, 409 conflict, 500 internal).

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use warden_core::{ApiEnvelope, UserRequest, WardenError};
use warden_store::Lifecycle;

use crate::sysinfo::SystemInfoSource;

/// Shared state for the API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub lifecycle: Arc<Lifecycle>,
    pub info: Arc<SystemInfoSource>,
}

/// Advisory status code for an error variant.
pub fn status_for(err: &WardenError) -> StatusCode {
    match err {
        WardenError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        WardenError::Unauthorized => StatusCode::UNAUTHORIZED,
        WardenError::NotFound(_) => StatusCode::NOT_FOUND,
        WardenError::Conflict(_) => StatusCode::CONFLICT,
        WardenError::Config(_)
        | WardenError::Io { .. }
        | WardenError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ok_response<T: Serialize>(message: &str, data: Option<T>) -> Response {
    let envelope = ApiEnvelope {
        success: true,
        message: message.to_string(),
        data,
    };
    (StatusCode::OK, Json(envelope)).into_response()
}

fn error_response(err: &WardenError) -> Response {
    let envelope: ApiEnvelope<()> = ApiEnvelope {
        success: false,
        message: err.to_string(),
        data: None,
    };
    (status_for(err), Json(envelope)).into_response()
}

fn body_or_400(body: Result<Json<UserRequest>, JsonRejection>) -> Result<UserRequest, Response> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(rejection) => Err(error_response(&WardenError::InvalidArgument(format!(
            "invalid request body: {rejection}"
        )))),
    }
}

/// POST /api/user/create
pub async fn create_user(
    State(state): State<ApiState>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Response {
    let req = match body_or_400(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match state
        .lifecycle
        .create(&req.secret, req.days.unwrap_or(0))
        .await
    {
        Ok(result) => ok_response("credential created", Some(result)),
        Err(err) => error_response(&err),
    }
}

/// POST /api/user/delete
pub async fn delete_user(
    State(state): State<ApiState>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Response {
    let req = match body_or_400(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match state.lifecycle.delete(&req.secret).await {
        Ok(()) => ok_response::<()>("credential deleted", None),
        Err(err) => error_response(&err),
    }
}

/// POST /api/user/renew
pub async fn renew_user(
    State(state): State<ApiState>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Response {
    let req = match body_or_400(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    match state
        .lifecycle
        .renew(&req.secret, req.days.unwrap_or(0))
        .await
    {
        Ok(result) => ok_response("credential renewed", Some(result)),
        Err(err) => error_response(&err),
    }
}

/// GET /api/users
pub async fn list_users(State(state): State<ApiState>) -> Response {
    match state.lifecycle.list().await {
        Ok(entries) => ok_response("credential listing", Some(entries)),
        Err(err) => error_response(&err),
    }
}

/// GET /api/info
pub async fn get_info(State(state): State<ApiState>) -> Response {
    let info = state.info.gather().await;
    ok_response("system info", Some(info))
}
