// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for vpnwarden.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup rather than silently ignoring typos.

use serde::{Deserialize, Serialize};

/// Top-level static service configuration.
///
/// Loaded once at startup from TOML with `WARDEN_` environment overrides.
/// Admin-mutable runtime state (notification group, VPS expiry date) lives
/// in the separate bot-state JSON document, not here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Control API bind address and key material.
    #[serde(default)]
    pub api: ApiConfig,

    /// Persisted store and sink file locations.
    #[serde(default)]
    pub store: StoreConfig,

    /// The managed VPN daemon.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Background worker intervals and snapshot placement.
    #[serde(default)]
    pub workers: WorkersConfig,

    /// Telegram front-end settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

/// Control API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Host address to bind.
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// File holding the shared-secret API key, read once at startup.
    /// When the file is missing the compiled default key is used.
    #[serde(default = "default_api_key_file")]
    pub api_key_file: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            api_key_file: default_api_key_file(),
        }
    }
}

/// Persisted store and sink locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Line-oriented credential file (`secret | YYYY-MM-DD` per line).
    #[serde(default = "default_credential_file")]
    pub credential_file: String,

    /// The daemon's own JSON config carrying the active-secrets list.
    #[serde(default = "default_access_config")]
    pub access_config: String,

    /// File holding the configured domain name (cosmetic display only).
    #[serde(default = "default_domain_file")]
    pub domain_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            credential_file: default_credential_file(),
            access_config: default_access_config(),
            domain_file: default_domain_file(),
        }
    }
}

/// The managed VPN daemon.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// systemd unit name restarted after lifecycle mutations.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port the daemon listens on (descriptive, surfaced by `/api/info`).
    #[serde(default = "default_service_port")]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_service_port(),
        }
    }
}

/// Background worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkersConfig {
    /// Expiry sweep interval in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Snapshot export interval in seconds.
    #[serde(default = "default_snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,

    /// Well-known snapshot file path, overwritten in place on each export.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Delivery size ceiling in bytes. Larger snapshots stay on disk and
    /// the admin is told where to fetch them.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            snapshot_interval_secs: default_snapshot_interval_secs(),
            snapshot_path: default_snapshot_path(),
            max_attachment_bytes: default_max_attachment_bytes(),
        }
    }
}

/// Telegram front-end configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Path of the bot-state JSON document (token, admin, notification
    /// group, VPS expiry). Reloaded fresh on every dashboard render.
    #[serde(default = "default_bot_state_path")]
    pub bot_state_path: String,

    /// Base URL of the control API the bot talks to.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_state_path: default_bot_state_path(),
            api_url: default_api_url(),
        }
    }
}

fn default_agent_name() -> String {
    "vpnwarden".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_api_key_file() -> String {
    "/etc/vpnwarden/apikey".to_string()
}

fn default_credential_file() -> String {
    "/etc/vpnwarden/users.db".to_string()
}

fn default_access_config() -> String {
    "/etc/vpnwarden/config.json".to_string()
}

fn default_domain_file() -> String {
    "/etc/vpnwarden/domain".to_string()
}

fn default_service_name() -> String {
    "vpnd".to_string()
}

fn default_service_port() -> u16 {
    5667
}

fn default_sweep_interval_secs() -> u64 {
    30
}

fn default_snapshot_interval_secs() -> u64 {
    3 * 60 * 60
}

fn default_snapshot_path() -> String {
    "/etc/vpnwarden/backups/snapshot_users.json".to_string()
}

fn default_max_attachment_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_bot_state_path() -> String {
    "/etc/vpnwarden/bot-state.json".to_string()
}

fn default_api_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = WardenConfig::default();
        assert_eq!(config.agent.name, "vpnwarden");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.workers.sweep_interval_secs, 30);
        assert_eq!(config.workers.snapshot_interval_secs, 10800);
        assert_eq!(config.workers.max_attachment_bytes, 50 * 1024 * 1024);
        assert!(config.telegram.api_url.ends_with("/api"));
    }
}
