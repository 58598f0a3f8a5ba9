// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The line-oriented credential file.
//!
//! One record per line as `secret | YYYY-MM-DD`. The file is the single
//! source of truth for expiry dates. Reads tolerate a missing file (empty
//! store) and skip blank lines; writes are a full overwrite of the
//! newline-joined serialization.

use std::path::{Path, PathBuf};

use warden_core::{CredentialRecord, WardenError};

/// Handle on the credential flat file.
#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every record, in file order.
    ///
    /// A missing file is an empty store, not an error. Blank lines are
    /// skipped. A line without a `|` separator becomes a record with an
    /// empty expiry so a load/save cycle does not drop it.
    pub fn load(&self) -> Result<Vec<CredentialRecord>, WardenError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let records = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_line)
            .collect();
        Ok(records)
    }

    /// Overwrites the file with the full record set.
    pub fn save(&self, records: &[CredentialRecord]) -> Result<(), WardenError> {
        let mut out = String::new();
        for record in records {
            out.push_str(&format_line(record));
            out.push('\n');
        }
        std::fs::write(&self.path, out)?;
        Ok(())
    }
}

fn parse_line(line: &str) -> CredentialRecord {
    match line.split_once('|') {
        Some((secret, expires_on)) => CredentialRecord {
            secret: secret.trim().to_string(),
            expires_on: expires_on.trim().to_string(),
        },
        None => CredentialRecord {
            secret: line.trim().to_string(),
            expires_on: String::new(),
        },
    }
}

fn format_line(record: &CredentialRecord) -> String {
    if record.expires_on.is_empty() {
        record.secret.clone()
    } else {
        format!("{} | {}", record.secret, record.expires_on)
    }
}
