// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notification seam for the workers.
//!
//! Workers report through this trait instead of holding a bot handle, so
//! they can run under test (or headless via `warden sweep`) without a live
//! Telegram connection.

use std::path::Path;

use async_trait::async_trait;
use warden_core::WardenError;

/// Delivery channel for worker reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), WardenError>;

    async fn send_document(&self, path: &Path, caption: &str) -> Result<(), WardenError>;
}

/// Discards every notification. Used by one-shot CLI runs and tests.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send_text(&self, _text: &str) -> Result<(), WardenError> {
        Ok(())
    }

    async fn send_document(&self, _path: &Path, _caption: &str) -> Result<(), WardenError> {
        Ok(())
    }
}
