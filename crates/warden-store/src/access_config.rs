// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The VPN daemon's own JSON config, consumed here as the access sink.
//!
//! This core owns exactly one thing in that document: the ordered list of
//! active secrets under `auth.config`, which the daemon uses for its auth
//! check. Every other field (`listen`, certificate paths, obfuscation
//! settings) is preserved verbatim across a rewrite.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warden_core::WardenError;

/// The subset of the daemon config this core reads and writes, with all
/// unrecognized fields retained through `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub auth: AuthSection,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The daemon's auth block. `config` is the active-secrets list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSection {
    #[serde(default)]
    pub mode: String,

    #[serde(default)]
    pub config: Vec<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Handle on the daemon config file.
#[derive(Debug, Clone)]
pub struct AccessConfigFile {
    path: PathBuf,
}

impl AccessConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the daemon config. Unlike the credential file, a missing or
    /// unreadable daemon config is an error: the daemon cannot run without
    /// it, so its absence means the deployment is broken.
    pub fn load(&self) -> Result<AccessConfig, WardenError> {
        let raw = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw)
            .map_err(|e| WardenError::Config(format!("daemon config is not valid JSON: {e}")))
    }

    /// Writes the config back, pretty-printed.
    pub fn save(&self, config: &AccessConfig) -> Result<(), WardenError> {
        let raw = serde_json::to_string_pretty(config)
            .map_err(|e| WardenError::Config(format!("failed to serialize daemon config: {e}")))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAEMON_CONFIG: &str = r#"{
        "listen": ":5667",
        "cert": "/etc/vpnd/cert.pem",
        "key": "/etc/vpnd/key.pem",
        "obfs": "warden",
        "auth": {
            "mode": "passwords",
            "config": ["alpha", "beta"]
        }
    }"#;

    #[test]
    fn loads_secrets_list() {
        let dir = tempfile::tempdir().unwrap();
        let file = AccessConfigFile::new(dir.path().join("config.json"));
        std::fs::write(file.path(), DAEMON_CONFIG).unwrap();

        let config = file.load().unwrap();
        assert_eq!(config.auth.mode, "passwords");
        assert_eq!(config.auth.config, vec!["alpha", "beta"]);
    }

    #[test]
    fn rewrite_preserves_unowned_fields() {
        let dir = tempfile::tempdir().unwrap();
        let file = AccessConfigFile::new(dir.path().join("config.json"));
        std::fs::write(file.path(), DAEMON_CONFIG).unwrap();

        let mut config = file.load().unwrap();
        config.auth.config.push("gamma".into());
        file.save(&config).unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["listen"], ":5667");
        assert_eq!(value["cert"], "/etc/vpnd/cert.pem");
        assert_eq!(value["obfs"], "warden");
        assert_eq!(value["auth"]["mode"], "passwords");
        assert_eq!(value["auth"]["config"][2], "gamma");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = AccessConfigFile::new(dir.path().join("config.json"));
        assert!(matches!(file.load(), Err(WardenError::Io { .. })));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = AccessConfigFile::new(dir.path().join("config.json"));
        std::fs::write(file.path(), "{ broken").unwrap();
        assert!(matches!(file.load(), Err(WardenError::Config(_))));
    }
}
