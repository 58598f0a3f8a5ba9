// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for external collaborators.

use async_trait::async_trait;

use crate::error::WardenError;

/// Controls the external VPN daemon process.
///
/// The lifecycle engine never inspects *why* a restart failed beyond
/// propagating the error; a failure after a committed store mutation is
/// reported to the caller while the mutation stays in place.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// Restarts the VPN daemon.
    async fn restart(&self) -> Result<(), WardenError>;
}

/// A `ServiceControl` that always succeeds without touching anything.
///
/// Used by tests and by deployments where the daemon picks up config
/// changes on its own.
#[derive(Debug, Default)]
pub struct NoopServiceControl;

#[async_trait]
impl ServiceControl for NoopServiceControl {
    async fn restart(&self) -> Result<(), WardenError> {
        Ok(())
    }
}
