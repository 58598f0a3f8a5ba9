// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expiry sweep: deletes credentials whose expiry has passed.
//!
//! Runs through the control API rather than against the files directly, so
//! every removal goes through the same serialized lifecycle path as an
//! operator-initiated delete. The sweep runs once at startup and then on a
//! fixed interval; the manual menu path reuses [`ExpirySweep::run_once`]
//! with restart semantics.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use warden_api::ApiClient;
use warden_core::{ServiceControl, WardenError, DATE_FORMAT};

use crate::notify::Notifier;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ceiling on the deleted-secrets listing embedded in a notification.
const LIST_CHAR_LIMIT: usize = 500;

/// Periodic deletion of lapsed credentials.
pub struct ExpirySweep {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    control: Arc<dyn ServiceControl>,
    interval: Duration,
}

impl ExpirySweep {
    pub fn new(
        client: ApiClient,
        notifier: Arc<dyn Notifier>,
        control: Arc<dyn ServiceControl>,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            notifier,
            control,
            interval,
        }
    }

    /// Runs the sweep until cancelled. The first pass happens immediately.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("expiry sweep shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once(false).await {
                            warn!(error = %e, "expiry sweep pass failed");
                        }
                    }
                }
            }
        })
    }

    /// One sweep pass. Returns the secrets that were deleted.
    ///
    /// In manual mode the daemon is additionally restarted when anything was
    /// deleted, and the admin is always notified of the outcome. In
    /// background mode a notification goes out only when something was
    /// deleted.
    pub async fn run_once(&self, manual: bool) -> Result<Vec<String>, WardenError> {
        let users = self.client.users().await?;
        let now = Local::now().naive_local();

        let mut deleted = Vec::new();
        for entry in &users {
            match lapsed(&entry.expires_on, now) {
                Some(true) => match self.client.delete(&entry.secret).await {
                    Ok(()) => {
                        info!(secret = %entry.secret, expires_on = %entry.expires_on,
                            "removed expired credential");
                        deleted.push(entry.secret.clone());
                    }
                    Err(e) => {
                        warn!(secret = %entry.secret, error = %e,
                            "failed to remove expired credential");
                    }
                },
                Some(false) => {}
                None => {
                    debug!(secret = %entry.secret, expires_on = %entry.expires_on,
                        "skipping credential with unparsable expiry");
                }
            }
        }

        if manual {
            self.report_manual(&deleted).await;
        } else if !deleted.is_empty() {
            let text = format!(
                "🗑️ *EXPIRED CLEANUP*\n\nRemoved `{}` lapsed credentials:\n- {}",
                deleted.len(),
                truncate_join(&deleted, LIST_CHAR_LIMIT)
            );
            self.notify(&text).await;
        }

        Ok(deleted)
    }

    async fn report_manual(&self, deleted: &[String]) {
        if deleted.is_empty() {
            self.notify("✅ No expired credentials found. Restart skipped.")
                .await;
            return;
        }

        match self.control.restart().await {
            Ok(()) => {
                self.notify(&format!(
                    "🔄 Removed {} expired credentials and restarted the service.",
                    deleted.len()
                ))
                .await;
            }
            Err(e) => {
                warn!(error = %e, "service restart after cleanup failed");
                self.notify("❌ Cleanup done, but the service restart failed. Check the server logs.")
                    .await;
            }
        }
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send_text(text).await {
            warn!(error = %e, "sweep notification failed");
        }
    }
}

/// Whether the expiry string denotes a moment strictly before `now`.
/// `None` when the string matches neither accepted format.
fn lapsed(expires_on: &str, now: NaiveDateTime) -> Option<bool> {
    let moment = NaiveDate::parse_from_str(expires_on, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| NaiveDateTime::parse_from_str(expires_on, DATETIME_FORMAT).ok())?;
    Some(now > moment)
}

/// Comma-joined listing, cut off at `limit` characters.
fn truncate_join(items: &[String], limit: usize) -> String {
    let joined = items.join(", ");
    if joined.chars().count() <= limit {
        return joined;
    }
    let cut: String = joined.chars().take(limit).collect();
    format!("{cut}...")
}
