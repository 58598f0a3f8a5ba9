// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge hierarchy: `./warden.toml` > `~/.config/vpnwarden/warden.toml` >
//! `/etc/vpnwarden/warden.toml`, with `WARDEN_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use warden_core::WardenError;

use crate::model::WardenConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/vpnwarden/warden.toml` (system-wide)
/// 3. `~/.config/vpnwarden/warden.toml` (user XDG config)
/// 4. `./warden.toml` (local directory)
/// 5. `WARDEN_*` environment variables
pub fn load_config() -> Result<WardenConfig, WardenError> {
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::file("/etc/vpnwarden/warden.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("vpnwarden/warden.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("warden.toml"))
        .merge(env_provider())
        .extract()
        .map_err(|e| WardenError::Config(e.to_string()))
}

/// Load configuration from a TOML string only (no file hierarchy).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<WardenConfig, WardenError> {
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
        .map_err(|e| WardenError::Config(e.to_string()))
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WardenConfig, WardenError> {
    Figment::new()
        .merge(Serialized::defaults(WardenConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(|e| WardenError::Config(e.to_string()))
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `WARDEN_API_API_KEY_FILE` must map to
/// `api.api_key_file`, not `api.api.key.file`.
fn env_provider() -> Env {
    Env::prefixed("WARDEN_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("api_", "api.", 1)
            .replacen("store_", "store.", 1)
            .replacen("service_", "service.", 1)
            .replacen("workers_", "workers.", 1)
            .replacen("telegram_", "telegram.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [api]
            port = 9090

            [workers]
            sweep_interval_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.workers.sweep_interval_secs, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.service.name, "vpnd");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [api]
            prot = 9090
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_config_is_valid() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "vpnwarden");
    }
}
