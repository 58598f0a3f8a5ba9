// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the vpnwarden workspace.

use thiserror::Error;

/// The primary error type used across all vpnwarden crates.
///
/// Variants map onto the advisory HTTP status codes of the control API:
/// `InvalidArgument` → 400, `Unauthorized` → 401, `NotFound` → 404,
/// `Conflict` → 409, everything else → 500.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Malformed or missing input, resolved at the boundary that detected it.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// API key mismatch. Short-circuits before any business logic runs.
    #[error("unauthorized")]
    Unauthorized,

    /// Unknown secret on delete/renew.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate secret on create.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration errors (unreadable files, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Store or sink read/write failed. The current operation is aborted;
    /// a prior successful write to the other file is not rolled back.
    #[error("i/o error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Daemon restart failed, or the control API was unreachable or timed
    /// out. State may already have mutated when this surfaces.
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WardenError {
    /// Convenience constructor for upstream failures without a source.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        fn read() -> Result<(), WardenError> {
            Err(std::io::Error::other("disk gone"))?;
            Ok(())
        }
        let err = read().unwrap_err();
        assert!(matches!(err, WardenError::Io { .. }));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn upstream_constructor_carries_message() {
        let err = WardenError::upstream("restart failed");
        assert_eq!(err.to_string(), "upstream error: restart failed");
    }
}
