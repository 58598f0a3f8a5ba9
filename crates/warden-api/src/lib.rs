// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Control API for vpnwarden.
//!
//! Serves the authenticated `/api` surface over the credential store and
//! provides the typed [`ApiClient`] the Telegram front-end and workers use
//! to reach it.

pub mod auth;
pub mod client;
pub mod handlers;
pub mod server;
pub mod sysinfo;

pub use auth::{AuthConfig, DEFAULT_API_KEY};
pub use client::ApiClient;
pub use handlers::ApiState;
pub use server::{build_router, start_server, ServerConfig};
pub use sysinfo::SystemInfoSource;
