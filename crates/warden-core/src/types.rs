// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the store, the control API, the Telegram
//! front-end, and the background workers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The fixed calendar representation used everywhere a date crosses a file
/// or wire boundary. Fixed-width and zero-padded, so lexicographic order is
/// chronological order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Telegram identity of an operator driving the conversational front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub i64);

/// A single credential in the flat-file store.
///
/// `expires_on` is kept as the raw string from the store file: an
/// unparsable expiry must survive a load/save round-trip untouched, and the
/// sweep treats it as "not yet expired" rather than deleting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub secret: String,
    pub expires_on: String,
}

/// Derived lifecycle status of a credential.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum CredentialStatus {
    Active,
    Expired,
}

impl CredentialStatus {
    /// Derives the status by lexicographic comparison against today's
    /// fixed-width date string. Equivalent to chronological comparison only
    /// because [`DATE_FORMAT`] is zero-padded.
    pub fn derive(expires_on: &str, today: &str) -> Self {
        if expires_on < today {
            Self::Expired
        } else {
            Self::Active
        }
    }
}

/// Uniform response envelope for every control API operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Request body for create and renew operations.
///
/// `limit_ip` and `limit_quota` are carried through the wire contract but
/// not interpreted by this core; the daemon deployment decides what, if
/// anything, to do with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub secret: String,
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_quota: Option<String>,
}

impl UserRequest {
    /// Request carrying only a secret (delete).
    pub fn secret_only(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            days: None,
            limit_ip: None,
            limit_quota: None,
        }
    }
}

/// Payload returned by a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult {
    pub secret: String,
    pub expires_on: String,
    pub domain: String,
}

/// Payload returned by a successful renew.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewResult {
    pub secret: String,
    pub expires_on: String,
}

/// One entry of the credential listing, with derived status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntry {
    pub secret: String,
    pub expires_on: String,
    pub status: CredentialStatus,
}

/// Descriptive system information returned by `GET /api/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub domain: String,
    pub public_ip: String,
    pub private_ip: String,
    pub port: String,
    pub service: String,
}

/// One entry of the snapshot export file: a [`UserEntry`] annotated with
/// the domain it was exported from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub host: String,
    pub secret: String,
    pub expires_on: String,
    pub status: CredentialStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_derivation_is_lexicographic() {
        assert_eq!(
            CredentialStatus::derive("2026-01-01", "2026-06-15"),
            CredentialStatus::Expired
        );
        assert_eq!(
            CredentialStatus::derive("2026-06-15", "2026-06-15"),
            CredentialStatus::Active
        );
        assert_eq!(
            CredentialStatus::derive("2027-01-01", "2026-06-15"),
            CredentialStatus::Active
        );
    }

    #[test]
    fn garbage_expiry_never_compares_expired_spuriously() {
        // Lexicographic comparison on a non-date string is still defined;
        // the sweep layer, not this helper, decides what to do with it.
        let status = CredentialStatus::derive("soon", "2026-06-15");
        assert_eq!(status, CredentialStatus::Active);
    }

    #[test]
    fn envelope_omits_absent_data() {
        let env: ApiEnvelope<()> = ApiEnvelope {
            success: false,
            message: "unauthorized".into(),
            data: None,
        };
        let json = serde_json::to_string(&env).unwrap();
        assert!(!json.contains("data"));
    }

    #[test]
    fn user_request_uses_camel_case_limits() {
        let req = UserRequest {
            secret: "abc123".into(),
            days: Some(5),
            limit_ip: Some("2".into()),
            limit_quota: Some("10".into()),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"limitIp\":\"2\""));
        assert!(json.contains("\"limitQuota\":\"10\""));
    }

    #[test]
    fn snapshot_entry_round_trips() {
        let entry = SnapshotEntry {
            host: "vpn.example.net".into(),
            secret: "abc123".into(),
            expires_on: "2026-09-01".into(),
            status: CredentialStatus::Active,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"expiresOn\":\"2026-09-01\""));
        let back: SnapshotEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.secret, "abc123");
    }
}
