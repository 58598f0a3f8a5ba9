// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Restore from an uploaded snapshot file.
//!
//! The snapshot is the JSON array the export worker writes. Each entry is
//! re-created through the control API with the days remaining until its
//! recorded expiry; entries already past their expiry are skipped and
//! entries whose dates cannot be read are counted as failures.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};
use warden_core::{SnapshotEntry, UserRequest, WardenError, DATE_FORMAT};

use warden_api::ApiClient;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tally of one restore run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RestoreSummary {
    pub fn render(&self) -> String {
        format!(
            "✅ *RESTORE FINISHED*\nTotal: {}\n✅ Restored: {}\n⚠️ Skipped: {}\n❌ Failed: {}",
            self.total, self.succeeded, self.skipped, self.failed
        )
    }
}

/// Decodes an uploaded snapshot document.
pub fn parse_snapshot(bytes: &[u8]) -> Result<Vec<SnapshotEntry>, WardenError> {
    serde_json::from_slice(bytes).map_err(|e| {
        WardenError::InvalidArgument(format!("snapshot file is not a valid JSON array: {e}"))
    })
}

/// Whole days from `now` until the recorded expiry. `None` when the date
/// matches neither accepted format.
pub fn remaining_days(expires_on: &str, now: NaiveDateTime) -> Option<i64> {
    let expiry = NaiveDate::parse_from_str(expires_on, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .or_else(|| NaiveDateTime::parse_from_str(expires_on, DATETIME_FORMAT).ok())?;
    Some((expiry - now).num_hours() / 24)
}

/// Re-creates every future-dated entry through the control API.
pub async fn restore_entries(
    client: &ApiClient,
    entries: &[SnapshotEntry],
    now: NaiveDateTime,
) -> RestoreSummary {
    let mut summary = RestoreSummary {
        total: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        let Some(days) = remaining_days(&entry.expires_on, now) else {
            debug!(secret = %entry.secret, expires_on = %entry.expires_on,
                "snapshot entry with unreadable expiry");
            summary.failed += 1;
            continue;
        };
        if days <= 0 {
            summary.skipped += 1;
            continue;
        }

        let request = UserRequest {
            secret: entry.secret.clone(),
            days: Some(days),
            limit_ip: None,
            limit_quota: None,
        };
        match client.create(&request).await {
            Ok(_) => summary.succeeded += 1,
            Err(WardenError::Upstream { message, .. })
                if message.to_lowercase().contains("already exists") =>
            {
                summary.skipped += 1;
            }
            Err(e) => {
                warn!(secret = %entry.secret, error = %e, "restore of snapshot entry failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::CredentialStatus;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(secret: &str, expires_on: &str) -> SnapshotEntry {
        SnapshotEntry {
            host: "vpn.example.net".into(),
            secret: secret.into(),
            expires_on: expires_on.into(),
            status: CredentialStatus::Active,
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn remaining_days_floors_partial_days() {
        let now = noon(2026, 8, 29);
        // Midnight five days out is 4.5 days away from noon.
        assert_eq!(remaining_days("2026-09-03", now), Some(4));
        assert_eq!(remaining_days("2026-08-28", now), Some(-1));
        assert_eq!(remaining_days("2026-09-03 18:30:00", now), Some(5));
        assert_eq!(remaining_days("eventually", now), None);
    }

    #[test]
    fn parse_rejects_non_array_documents() {
        assert!(parse_snapshot(b"{\"secret\": \"a\"}").is_err());
        assert!(parse_snapshot(b"not json").is_err());

        let entries = parse_snapshot(
            br#"[{"host": "h", "secret": "a", "expiresOn": "2026-09-01", "status": "Active"}]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].secret, "a");
    }

    #[tokio::test]
    async fn tallies_restored_skipped_and_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/create"))
            .and(body_partial_json(serde_json::json!({"secret": "fresh"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "credential created",
                "data": {"secret": "fresh", "expiresOn": "2030-01-01", "domain": "d"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/create"))
            .and(body_partial_json(serde_json::json!({"secret": "taken"})))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "success": false,
                "message": "conflict: credential 'taken' already exists"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "test-key");
        let entries = vec![
            entry("fresh", "2030-01-01"),
            entry("taken", "2030-01-01"),
            entry("lapsed", "2000-01-01"),
            entry("garbled", "whenever"),
        ];

        let summary = restore_entries(&client, &entries, noon(2026, 8, 29)).await;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 1);
    }
}
