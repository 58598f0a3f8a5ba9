// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Production [`ServiceControl`] implementation over systemd.

use async_trait::async_trait;
use tracing::{info, warn};
use warden_core::{ServiceControl, WardenError};

/// Restarts a systemd unit via `systemctl restart <unit>`.
#[derive(Debug, Clone)]
pub struct SystemdControl {
    unit: String,
}

impl SystemdControl {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

#[async_trait]
impl ServiceControl for SystemdControl {
    async fn restart(&self) -> Result<(), WardenError> {
        let status = tokio::process::Command::new("systemctl")
            .arg("restart")
            .arg(&self.unit)
            .status()
            .await
            .map_err(|e| WardenError::Upstream {
                message: format!("failed to spawn systemctl: {e}"),
                source: Some(Box::new(e)),
            })?;

        if status.success() {
            info!(unit = %self.unit, "service restarted");
            Ok(())
        } else {
            warn!(unit = %self.unit, %status, "systemctl restart failed");
            Err(WardenError::upstream(format!(
                "systemctl restart {} exited with {status}",
                self.unit
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn restart_of_unknown_unit_fails() {
        // systemctl is either absent (spawn error) or rejects the unit.
        let control = SystemdControl::new("vpnwarden-test-unit-that-does-not-exist");
        assert!(control.restart().await.is_err());
    }
}
