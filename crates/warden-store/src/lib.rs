// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable credential storage for vpnwarden.
//!
//! Two persisted sets with one engine over them: the line-oriented
//! credential file (source of truth for expiry dates) and the daemon's own
//! JSON config (source of truth for which secrets authenticate). The
//! [`Lifecycle`] engine keeps both in sync through serialized
//! read-modify-persist mutations.

pub mod access_config;
pub mod credential_file;
pub mod lifecycle;
pub mod systemd;

pub use access_config::{AccessConfig, AccessConfigFile, AuthSection};
pub use credential_file::CredentialFile;
pub use lifecycle::{today_string, Lifecycle};
pub use systemd::SystemdControl;
