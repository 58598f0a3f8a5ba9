// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the vpnwarden workspace.
//!
//! Provides the error taxonomy, the shared domain and wire types, and the
//! trait seams implemented elsewhere in the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WardenError;
pub use traits::{NoopServiceControl, ServiceControl};
pub use types::{
    ApiEnvelope, CreateResult, CredentialRecord, CredentialStatus, OperatorId, RenewResult,
    SnapshotEntry, SystemInfo, UserEntry, UserRequest, DATE_FORMAT,
};
