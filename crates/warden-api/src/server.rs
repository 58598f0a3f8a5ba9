// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Control API server built on axum.
//!
//! Sets up the `/api` routes, the auth middleware, and request tracing.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use warden_core::WardenError;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers::{self, ApiState};

/// Control API bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the `/api` router with every route behind the auth middleware.
pub fn build_router(auth: AuthConfig, state: ApiState) -> Router {
    Router::new()
        .route("/api/user/create", post(handlers::create_user))
        .route("/api/user/delete", post(handlers::delete_user))
        .route("/api/user/renew", post(handlers::renew_user))
        .route("/api/users", get(handlers::list_users))
        .route("/api/info", get(handlers::get_info))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Binds and serves the control API until the process exits.
pub async fn start_server(
    config: &ServerConfig,
    auth: AuthConfig,
    state: ApiState,
) -> Result<(), WardenError> {
    let app = build_router(auth, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WardenError::Upstream {
            message: format!("failed to bind control API to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("control API listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| WardenError::Upstream {
            message: format!("control API server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
