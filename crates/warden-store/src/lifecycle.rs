// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The account lifecycle engine: create, delete, renew, list.
//!
//! All mutations serialize behind one process-wide mutex held for the whole
//! read-modify-persist sequence, so concurrent requests cannot interleave
//! and lose updates. The lock does not protect against external processes
//! writing the files concurrently; that is out of scope.
//!
//! Existence checks are deliberately split between the two persisted sets:
//! create and delete check the access-entry set, renew and list check the
//! credential file. A partial failure can leave the sets transiently
//! inconsistent, and re-running the failed operation converges them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use tokio::sync::Mutex;
use tracing::{info, warn};
use warden_core::{
    CreateResult, CredentialRecord, CredentialStatus, RenewResult, ServiceControl, UserEntry,
    WardenError, DATE_FORMAT,
};

use crate::access_config::AccessConfigFile;
use crate::credential_file::CredentialFile;

/// Today's date in the fixed wire representation.
pub fn today_string() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// The lifecycle engine over the credential store and the access sink.
pub struct Lifecycle {
    credentials: CredentialFile,
    access: AccessConfigFile,
    domain_file: PathBuf,
    control: Arc<dyn ServiceControl>,
    /// Guards every read-modify-persist sequence.
    mutation_lock: Mutex<()>,
}

impl Lifecycle {
    pub fn new(
        credentials: CredentialFile,
        access: AccessConfigFile,
        domain_file: impl Into<PathBuf>,
        control: Arc<dyn ServiceControl>,
    ) -> Self {
        Self {
            credentials,
            access,
            domain_file: domain_file.into(),
            control,
            mutation_lock: Mutex::new(()),
        }
    }

    /// The configured domain name, or a placeholder when the domain file
    /// is absent. Cosmetic only.
    pub fn domain(&self) -> String {
        read_domain(&self.domain_file)
    }

    /// Provisions a new credential valid for `days` days from today.
    ///
    /// Fails with `Conflict` when the secret is already in the access-entry
    /// set. The daemon is restarted after both files are persisted; a
    /// restart failure is reported even though the mutation is committed.
    pub async fn create(&self, secret: &str, days: i64) -> Result<CreateResult, WardenError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(WardenError::InvalidArgument("secret must not be empty".into()));
        }
        if days <= 0 {
            return Err(WardenError::InvalidArgument(
                "days must be a positive integer".into(),
            ));
        }

        let _guard = self.mutation_lock.lock().await;

        let mut access = self.access.load()?;
        if access.auth.config.iter().any(|s| s == secret) {
            return Err(WardenError::Conflict(format!(
                "credential '{secret}' already exists"
            )));
        }
        access.auth.config.push(secret.to_string());
        self.access.save(&access)?;

        let expires_on = add_days(today(), days);
        let mut records = self.credentials.load()?;
        records.push(CredentialRecord {
            secret: secret.to_string(),
            expires_on: expires_on.clone(),
        });
        self.credentials.save(&records)?;

        info!(secret, expires_on = expires_on.as_str(), "credential created");
        self.control.restart().await?;

        Ok(CreateResult {
            secret: secret.to_string(),
            expires_on,
            domain: self.domain(),
        })
    }

    /// Revokes a credential, removing it from both persisted sets.
    ///
    /// Existence is defined by the access-entry set; matching credential
    /// records are purged as well.
    pub async fn delete(&self, secret: &str) -> Result<(), WardenError> {
        let secret = secret.trim();
        let _guard = self.mutation_lock.lock().await;

        let mut access = self.access.load()?;
        let before = access.auth.config.len();
        access.auth.config.retain(|s| s != secret);
        if access.auth.config.len() == before {
            return Err(WardenError::NotFound(format!(
                "credential '{secret}' does not exist"
            )));
        }
        self.access.save(&access)?;

        let mut records = self.credentials.load()?;
        records.retain(|r| r.secret != secret);
        self.credentials.save(&records)?;

        info!(secret, "credential deleted");
        self.control.restart().await?;
        Ok(())
    }

    /// Extends a credential by `days` days.
    ///
    /// A still-active credential extends from its current expiry; a lapsed
    /// or unparsable expiry restarts the clock from today (lapsed days are
    /// not credited back).
    pub async fn renew(&self, secret: &str, days: i64) -> Result<RenewResult, WardenError> {
        let secret = secret.trim();
        if days <= 0 {
            return Err(WardenError::InvalidArgument(
                "days must be a positive integer".into(),
            ));
        }

        let _guard = self.mutation_lock.lock().await;

        let mut records = self.credentials.load()?;
        let record = records
            .iter_mut()
            .find(|r| r.secret == secret)
            .ok_or_else(|| {
                WardenError::NotFound(format!("credential '{secret}' does not exist"))
            })?;

        let today = today();
        let base = match NaiveDate::parse_from_str(record.expires_on.trim(), DATE_FORMAT) {
            Ok(current) if current >= today => current,
            Ok(_) => today,
            Err(_) => {
                warn!(
                    secret,
                    expires_on = record.expires_on.as_str(),
                    "unparsable expiry, renewing from today"
                );
                today
            }
        };
        let expires_on = add_days(base, days);
        record.expires_on = expires_on.clone();
        self.credentials.save(&records)?;

        info!(secret, expires_on = expires_on.as_str(), "credential renewed");
        // Strictly unnecessary for a renew, but kept for consistency with
        // the other mutations.
        self.control.restart().await?;

        Ok(RenewResult {
            secret: secret.to_string(),
            expires_on,
        })
    }

    /// Lists every credential record with its derived status.
    ///
    /// Records without an expiry (legacy lines lacking a separator) are
    /// omitted, matching the flat file's listing semantics.
    pub async fn list(&self) -> Result<Vec<UserEntry>, WardenError> {
        let records = self.credentials.load()?;
        let today = today_string();
        Ok(records
            .into_iter()
            .filter(|r| !r.expires_on.is_empty())
            .map(|r| UserEntry {
                status: CredentialStatus::derive(&r.expires_on, &today),
                secret: r.secret,
                expires_on: r.expires_on,
            })
            .collect())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn add_days(base: NaiveDate, days: i64) -> String {
    base.checked_add_days(Days::new(days as u64))
        .unwrap_or(base)
        .format(DATE_FORMAT)
        .to_string()
}

fn read_domain(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => "not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_core::NoopServiceControl;

    /// Counts restarts; optionally fails every call.
    #[derive(Default)]
    struct RecordingControl {
        restarts: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ServiceControl for RecordingControl {
        async fn restart(&self) -> Result<(), WardenError> {
            self.restarts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(WardenError::upstream("restart failed"))
            } else {
                Ok(())
            }
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        lifecycle: Lifecycle,
        credentials: CredentialFile,
        access: AccessConfigFile,
    }

    fn fixture_with(control: Arc<dyn ServiceControl>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let credentials = CredentialFile::new(dir.path().join("users.db"));
        let access = AccessConfigFile::new(dir.path().join("config.json"));
        std::fs::write(
            access.path(),
            r#"{"listen": ":5667", "auth": {"mode": "passwords", "config": []}}"#,
        )
        .unwrap();
        let lifecycle = Lifecycle::new(
            credentials.clone(),
            access.clone(),
            dir.path().join("domain"),
            control,
        );
        Fixture {
            _dir: dir,
            lifecycle,
            credentials,
            access,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(NoopServiceControl))
    }

    fn days_from_today(days: i64) -> String {
        add_days(today(), days)
    }

    #[tokio::test]
    async fn create_on_empty_store() {
        let fx = fixture();
        let result = fx.lifecycle.create("abc123", 5).await.unwrap();
        assert_eq!(result.expires_on, days_from_today(5));

        let access = fx.access.load().unwrap();
        assert_eq!(access.auth.config, vec!["abc123"]);
        let records = fx.credentials.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].secret, "abc123");
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_keeps_original() {
        let fx = fixture();
        let first = fx.lifecycle.create("abc123", 5).await.unwrap();

        let err = fx.lifecycle.create("abc123", 3).await.unwrap_err();
        assert!(matches!(err, WardenError::Conflict(_)));

        let records = fx.credentials.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expires_on, first.expires_on);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_days() {
        let fx = fixture();
        for days in [0, -3] {
            let err = fx.lifecycle.create("abc123", days).await.unwrap_err();
            assert!(matches!(err, WardenError::InvalidArgument(_)));
        }
        assert!(fx.credentials.load().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_from_both_sets() {
        let fx = fixture();
        fx.lifecycle.create("abc123", 5).await.unwrap();
        fx.lifecycle.create("xyz789", 5).await.unwrap();

        fx.lifecycle.delete("abc123").await.unwrap();

        let access = fx.access.load().unwrap();
        assert_eq!(access.auth.config, vec!["xyz789"]);
        let records = fx.credentials.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].secret, "xyz789");
    }

    #[tokio::test]
    async fn delete_absent_secret_is_not_found_and_mutates_nothing() {
        let fx = fixture();
        fx.lifecycle.create("abc123", 5).await.unwrap();

        let err = fx.lifecycle.delete("ghost").await.unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));

        assert_eq!(fx.access.load().unwrap().auth.config, vec!["abc123"]);
        assert_eq!(fx.credentials.load().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn renew_active_extends_from_current_expiry() {
        let fx = fixture();
        fx.lifecycle.create("abc123", 5).await.unwrap();

        let result = fx.lifecycle.renew("abc123", 7).await.unwrap();
        assert_eq!(result.expires_on, days_from_today(12));
    }

    #[tokio::test]
    async fn renew_lapsed_restarts_from_today() {
        let fx = fixture();
        let lapsed = today().checked_sub_days(Days::new(10)).unwrap();
        fx.credentials
            .save(&[CredentialRecord {
                secret: "x".into(),
                expires_on: lapsed.format(DATE_FORMAT).to_string(),
            }])
            .unwrap();

        let result = fx.lifecycle.renew("x", 7).await.unwrap();
        assert_eq!(result.expires_on, days_from_today(7));
    }

    #[tokio::test]
    async fn renew_unparsable_expiry_restarts_from_today() {
        let fx = fixture();
        fx.credentials
            .save(&[CredentialRecord {
                secret: "x".into(),
                expires_on: "someday".into(),
            }])
            .unwrap();

        let result = fx.lifecycle.renew("x", 3).await.unwrap();
        assert_eq!(result.expires_on, days_from_today(3));
    }

    #[tokio::test]
    async fn renew_unknown_secret_is_not_found() {
        let fx = fixture();
        let err = fx.lifecycle.renew("ghost", 7).await.unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_derives_status() {
        let fx = fixture();
        fx.credentials
            .save(&[
                CredentialRecord {
                    secret: "old".into(),
                    expires_on: "2020-01-01".into(),
                },
                CredentialRecord {
                    secret: "fresh".into(),
                    expires_on: days_from_today(30),
                },
            ])
            .unwrap();

        let entries = fx.lifecycle.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, CredentialStatus::Expired);
        assert_eq!(entries[1].status, CredentialStatus::Active);
    }

    #[tokio::test]
    async fn restart_failure_surfaces_but_mutation_persists() {
        let control = Arc::new(RecordingControl {
            fail: true,
            ..Default::default()
        });
        let fx = fixture_with(control.clone());

        let err = fx.lifecycle.create("abc123", 5).await.unwrap_err();
        assert!(matches!(err, WardenError::Upstream { .. }));

        // The known inconsistency: the error surfaced, the data committed.
        assert_eq!(fx.access.load().unwrap().auth.config, vec!["abc123"]);
        assert_eq!(fx.credentials.load().unwrap().len(), 1);
        assert_eq!(control.restarts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_successful_mutation_restarts_the_daemon() {
        let control = Arc::new(RecordingControl::default());
        let fx = fixture_with(control.clone());

        fx.lifecycle.create("abc123", 5).await.unwrap();
        fx.lifecycle.renew("abc123", 2).await.unwrap();
        fx.lifecycle.delete("abc123").await.unwrap();

        assert_eq!(control.restarts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn domain_placeholder_when_file_missing() {
        let fx = fixture();
        assert_eq!(fx.lifecycle.domain(), "not set");
    }
}
