// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot export: periodic JSON dump of the credential listing.
//!
//! The snapshot is written to a well-known path (overwritten in place) and
//! then delivered to the admin as a document. Files over the attachment
//! ceiling are left on disk and only their location is reported.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use warden_api::ApiClient;
use warden_core::{SnapshotEntry, WardenError};

use crate::notify::Notifier;

/// Outcome of one export pass.
#[derive(Debug, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Nothing to export; no file written.
    Empty,
    /// Snapshot written and handed to the notifier.
    Delivered { path: PathBuf, bytes: u64 },
    /// Snapshot written but too large to attach; location reported instead.
    TooLarge { path: PathBuf, bytes: u64 },
}

/// Periodic credential snapshot export.
pub struct SnapshotExport {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    path: PathBuf,
    max_attachment_bytes: u64,
    interval: Duration,
}

impl SnapshotExport {
    pub fn new(
        client: ApiClient,
        notifier: Arc<dyn Notifier>,
        path: impl Into<PathBuf>,
        max_attachment_bytes: u64,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            notifier,
            path: path.into(),
            max_attachment_bytes,
            interval,
        }
    }

    /// Runs the export until cancelled. The first pass happens immediately.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("snapshot export shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        match self.run_once().await {
                            Ok(outcome) => debug!(?outcome, "snapshot pass finished"),
                            Err(e) => warn!(error = %e, "snapshot export pass failed"),
                        }
                    }
                }
            }
        })
    }

    /// One export pass: fetch, annotate, write, deliver.
    pub async fn run_once(&self) -> Result<SnapshotOutcome, WardenError> {
        let users = self.client.users().await?;
        if users.is_empty() {
            debug!("no credentials to snapshot");
            return Ok(SnapshotOutcome::Empty);
        }

        // Host annotation is best-effort; the snapshot is still useful
        // without it.
        let host = match self.client.info().await {
            Ok(info) => info.domain,
            Err(e) => {
                warn!(error = %e, "domain lookup for snapshot failed");
                "unknown".to_string()
            }
        };

        let entries: Vec<SnapshotEntry> = users
            .into_iter()
            .map(|u| SnapshotEntry {
                host: host.clone(),
                secret: u.secret,
                expires_on: u.expires_on,
                status: u.status,
            })
            .collect();

        let body = serde_json::to_vec_pretty(&entries).map_err(|e| WardenError::Upstream {
            message: format!("failed to serialize snapshot: {e}"),
            source: Some(Box::new(e)),
        })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, &body).await?;
        let bytes = body.len() as u64;
        info!(path = %self.path.display(), bytes, count = entries.len(), "snapshot written");

        if bytes > self.max_attachment_bytes {
            let text = format!(
                "⚠️ *SNAPSHOT TOO LARGE TO SEND*\n\nSize: {} MB (limit {} MB).\nThe file is kept on the server:\n`{}`",
                bytes / (1024 * 1024),
                self.max_attachment_bytes / (1024 * 1024),
                self.path.display()
            );
            self.notify(&text).await;
            return Ok(SnapshotOutcome::TooLarge {
                path: self.path.clone(),
                bytes,
            });
        }

        let caption = format!(
            "💾 *CREDENTIAL SNAPSHOT*\n📅 Taken: `{}`\n📁 Size: {:.2} MB\n📂 Location: `{}`",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            bytes as f64 / (1024.0 * 1024.0),
            self.path.display()
        );
        if let Err(e) = self.notifier.send_document(&self.path, &caption).await {
            warn!(error = %e, "snapshot delivery failed");
            self.notify(&format!(
                "❌ Snapshot delivery failed. The file is kept on the server:\n`{}`",
                self.path.display()
            ))
            .await;
        }

        Ok(SnapshotOutcome::Delivered {
            path: self.path.clone(),
            bytes,
        })
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send_text(text).await {
            warn!(error = %e, "snapshot notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct RecordingNotifier {
        texts: Mutex<Vec<String>>,
        documents: Mutex<Vec<(PathBuf, String)>>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(Vec::new()),
                documents: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_text(&self, text: &str) -> Result<(), WardenError> {
            self.texts.lock().await.push(text.to_string());
            Ok(())
        }

        async fn send_document(&self, path: &Path, caption: &str) -> Result<(), WardenError> {
            self.documents
                .lock()
                .await
                .push((path.to_path_buf(), caption.to_string()));
            Ok(())
        }
    }

    async fn mock_api(server: &MockServer, users: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": true, "message": "credential listing", "data": users}),
            ))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "system info",
                "data": {
                    "domain": "vpn.example.net",
                    "publicIp": "203.0.113.7",
                    "privateIp": "10.0.0.2",
                    "port": "5667",
                    "service": "vpnd"
                }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn writes_annotated_snapshot_and_delivers_it() {
        let server = MockServer::start().await;
        mock_api(
            &server,
            serde_json::json!([
                {"secret": "abc", "expiresOn": "2026-09-03", "status": "Active"}
            ]),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("backups/snapshot_users.json");
        let notifier = RecordingNotifier::new();
        let export = SnapshotExport::new(
            ApiClient::new(server.uri(), "test-key"),
            notifier.clone(),
            &snapshot_path,
            50 * 1024 * 1024,
            Duration::from_secs(3600),
        );

        let outcome = export.run_once().await.unwrap();
        assert!(matches!(outcome, SnapshotOutcome::Delivered { .. }));

        let written: Vec<SnapshotEntry> =
            serde_json::from_slice(&std::fs::read(&snapshot_path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].host, "vpn.example.net");
        assert_eq!(written[0].secret, "abc");

        let documents = notifier.documents.lock().await;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].0, snapshot_path);
    }

    #[tokio::test]
    async fn oversized_snapshot_reports_location_instead() {
        let server = MockServer::start().await;
        mock_api(
            &server,
            serde_json::json!([
                {"secret": "abc", "expiresOn": "2026-09-03", "status": "Active"}
            ]),
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot_users.json");
        let notifier = RecordingNotifier::new();
        let export = SnapshotExport::new(
            ApiClient::new(server.uri(), "test-key"),
            notifier.clone(),
            &snapshot_path,
            1,
            Duration::from_secs(3600),
        );

        let outcome = export.run_once().await.unwrap();
        assert!(matches!(outcome, SnapshotOutcome::TooLarge { .. }));
        assert!(snapshot_path.exists());
        assert!(notifier.documents.lock().await.is_empty());
        let texts = notifier.texts.lock().await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains(snapshot_path.to_str().unwrap()));
    }

    #[tokio::test]
    async fn empty_listing_writes_nothing() {
        let server = MockServer::start().await;
        mock_api(&server, serde_json::json!([])).await;

        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot_users.json");
        let notifier = RecordingNotifier::new();
        let export = SnapshotExport::new(
            ApiClient::new(server.uri(), "test-key"),
            notifier.clone(),
            &snapshot_path,
            50 * 1024 * 1024,
            Duration::from_secs(3600),
        );

        let outcome = export.run_once().await.unwrap();
        assert_eq!(outcome, SnapshotOutcome::Empty);
        assert!(!snapshot_path.exists());
    }
}
