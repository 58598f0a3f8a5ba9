// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wizard step transitions.
//!
//! [`advance`] is the whole conversation state machine: given the
//! operator's session and the text they just sent, it either re-prompts
//! (invalid input, state untouched), advances to the next prompt, or
//! produces a terminal action for the caller to execute against the
//! control API. Keeping it free of transport types makes every transition
//! unit-testable.

use chrono::NaiveDate;
use rand::Rng;
use warden_core::DATE_FORMAT;

use crate::session::{Session, SessionState};

const SECRET_KEY: &str = "secret";
const LIMIT_IP_KEY: &str = "limit_ip";
const LIMIT_QUOTA_KEY: &str = "limit_quota";

/// What the caller should do after feeding one input to the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Invalid input; send the message and stay on the current step.
    Reprompt(String),
    /// Input accepted; send the next prompt.
    Prompt(String),
    /// Wizard finished: create a credential.
    Create {
        secret: String,
        days: i64,
        limit_ip: String,
        limit_quota: String,
        trial: bool,
    },
    /// Wizard finished: renew a credential.
    Renew {
        secret: String,
        days: i64,
        limit_ip: String,
        limit_quota: String,
    },
    /// Wizard finished: persist the VPS expiry date.
    SetVpsDate(String),
    /// Wizard finished: persist the notification group id.
    SetGroupId(i64),
}

/// Feeds one turn of operator input into the session's wizard.
pub fn advance(session: &mut Session, input: &str) -> StepOutcome {
    let text = input.trim();

    match session.state {
        SessionState::CreateUsername => {
            if text.is_empty() {
                return StepOutcome::Reprompt("❌ The secret cannot be empty.".into());
            }
            session.scratch.insert(SECRET_KEY.into(), text.to_string());
            session.state = SessionState::CreateLimitIp;
            StepOutcome::Prompt(format!(
                "🔑 *CREATE*\nSecret: `{text}`\n\nEnter the *IP limit* (devices):"
            ))
        }

        SessionState::CreateLimitIp => match parse_limit(text) {
            Some(value) => {
                session.scratch.insert(LIMIT_IP_KEY.into(), value);
                session.state = SessionState::CreateLimitQuota;
                StepOutcome::Prompt("💾 *CREATE*\n\nEnter the *quota limit* (GB):".into())
            }
            None => StepOutcome::Reprompt("❌ The IP limit must be a number.".into()),
        },

        SessionState::CreateLimitQuota => match parse_limit(text) {
            Some(value) => {
                session.scratch.insert(LIMIT_QUOTA_KEY.into(), value);
                session.state = SessionState::CreateDays;
                StepOutcome::Prompt("📅 *CREATE*\n\nEnter the *duration* (days):".into())
            }
            None => StepOutcome::Reprompt("❌ The quota limit must be a number.".into()),
        },

        SessionState::CreateDays => match text.parse::<i64>() {
            Ok(days) => StepOutcome::Create {
                secret: scratch(session, SECRET_KEY),
                days,
                limit_ip: scratch(session, LIMIT_IP_KEY),
                limit_quota: scratch(session, LIMIT_QUOTA_KEY),
                trial: false,
            },
            Err(_) => StepOutcome::Reprompt("❌ The duration must be a number of days.".into()),
        },

        SessionState::CreateTrialDuration => match parse_trial_duration(text) {
            Some(days) => StepOutcome::Create {
                secret: scratch(session, SECRET_KEY),
                days,
                limit_ip: scratch(session, LIMIT_IP_KEY),
                limit_quota: scratch(session, LIMIT_QUOTA_KEY),
                trial: true,
            },
            None => StepOutcome::Reprompt(
                "❌ Unrecognized duration. Examples: `1h`, `1d`, or `1` for one day.".into(),
            ),
        },

        SessionState::RenewLimitIp => match parse_limit(text) {
            Some(value) => {
                session.scratch.insert(LIMIT_IP_KEY.into(), value);
                session.state = SessionState::RenewLimitQuota;
                StepOutcome::Prompt("💾 *RENEW*\n\nEnter the *quota limit* (GB):".into())
            }
            None => StepOutcome::Reprompt("❌ The IP limit must be a number.".into()),
        },

        SessionState::RenewLimitQuota => match parse_limit(text) {
            Some(value) => {
                session.scratch.insert(LIMIT_QUOTA_KEY.into(), value);
                session.state = SessionState::RenewDays;
                StepOutcome::Prompt("📅 *RENEW*\n\nEnter the *additional duration* (days):".into())
            }
            None => StepOutcome::Reprompt("❌ The quota limit must be a number.".into()),
        },

        SessionState::RenewDays => match text.parse::<i64>() {
            Ok(days) => StepOutcome::Renew {
                secret: scratch(session, SECRET_KEY),
                days,
                limit_ip: scratch(session, LIMIT_IP_KEY),
                limit_quota: scratch(session, LIMIT_QUOTA_KEY),
            },
            Err(_) => StepOutcome::Reprompt("❌ The duration must be a number of days.".into()),
        },

        SessionState::SetVpsDate => match NaiveDate::parse_from_str(text, DATE_FORMAT) {
            Ok(_) => StepOutcome::SetVpsDate(text.to_string()),
            Err(_) => StepOutcome::Reprompt(
                "❌ Wrong date format.\nUse `YYYY-MM-DD` (example: `2026-12-31`).".into(),
            ),
        },

        SessionState::SetGroupId => match text.parse::<i64>() {
            Ok(id) => StepOutcome::SetGroupId(id),
            Err(_) => StepOutcome::Reprompt(
                "❌ The group id must be a number (example: `-1001234567890`).".into(),
            ),
        },

        SessionState::WaitRestoreFile => {
            StepOutcome::Reprompt("❌ Please send the snapshot `.json` file.".into())
        }
    }
}

/// Trial duration input: a bare integer is days, `<n>h` is hours (rounded
/// up to whole days), `<n>d` is days.
pub fn parse_trial_duration(input: &str) -> Option<i64> {
    let lowered = input.trim().to_lowercase();

    if let Ok(days) = lowered.parse::<i64>() {
        return Some(days);
    }

    if let Some(hours) = lowered.strip_suffix('h') {
        let hours = hours.parse::<i64>().ok()?;
        if hours < 1 {
            return None;
        }
        // Round up to whole days; hours >= 1 keeps the result >= 1.
        return Some((hours + 23) / 24);
    }

    if let Some(days) = lowered.strip_suffix('d') {
        let days = days.parse::<i64>().ok()?;
        if days < 1 {
            return None;
        }
        return Some(days);
    }

    None
}

/// Random secret for trial credentials.
pub fn random_secret(length: usize) -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

fn parse_limit(text: &str) -> Option<String> {
    text.parse::<i64>().ok().map(|_| text.to_string())
}

fn scratch(session: &Session, key: &str) -> String {
    session.scratch.get(key).cloned().unwrap_or_default()
}
