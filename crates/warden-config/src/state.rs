// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The admin-mutable bot-state JSON document.
//!
//! Unlike the static [`crate::model::WardenConfig`], this document changes
//! at runtime (the admin can point notifications at a group or set the VPS
//! expiry date from the chat menu). It is deliberately re-read from disk on
//! every dashboard render so a concurrent update is never shadowed by a
//! stale in-memory copy.

use std::path::Path;

use serde::{Deserialize, Serialize};
use warden_core::WardenError;

/// Bot identity and admin-mutable runtime state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotState {
    /// Telegram bot token.
    pub bot_token: String,

    /// Telegram user id of the sole authorized operator.
    pub admin_id: i64,

    /// Optional group chat that receives masked copies of create
    /// notifications. Zero or absent means disabled.
    #[serde(default)]
    pub notif_group_id: Option<i64>,

    /// Optional infrastructure expiry date (`YYYY-MM-DD`), used purely for
    /// the dashboard countdown.
    #[serde(default)]
    pub vps_expired_date: Option<String>,
}

impl BotState {
    /// Reads the document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WardenError> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| WardenError::Config(format!("bot state is not valid JSON: {e}")))
    }

    /// Writes the whole document back, pretty-printed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), WardenError> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| WardenError::Config(format!("failed to serialize bot state: {e}")))?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot-state.json");

        let state = BotState {
            bot_token: "123456:ABC".into(),
            admin_id: 42,
            notif_group_id: Some(-1001234567890),
            vps_expired_date: Some("2026-12-31".into()),
        };
        state.save(&path).unwrap();

        let loaded = BotState::load(&path).unwrap();
        assert_eq!(loaded.admin_id, 42);
        assert_eq!(loaded.notif_group_id, Some(-1001234567890));
        assert_eq!(loaded.vps_expired_date.as_deref(), Some("2026-12-31"));
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot-state.json");
        std::fs::write(&path, r#"{"bot_token": "t", "admin_id": 7}"#).unwrap();

        let loaded = BotState::load(&path).unwrap();
        assert_eq!(loaded.admin_id, 7);
        assert!(loaded.notif_group_id.is_none());
        assert!(loaded.vps_expired_date.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = BotState::load("/nonexistent/bot-state.json");
        assert!(matches!(result, Err(WardenError::Io { .. })));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot-state.json");
        std::fs::write(&path, "not json").unwrap();

        let result = BotState::load(&path);
        assert!(matches!(result, Err(WardenError::Config(_))));
    }
}
