// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram admin front-end for vpnwarden.
//!
//! One authorized operator drives the whole credential lifecycle from
//! chat: guided create/renew wizards, paginated delete menus, trial
//! accounts, snapshot/restore, and the live dashboard. Everything mutating
//! goes through the control API client so the bot shares one code path
//! with the workers.

pub mod bot;
pub mod dashboard;
pub mod menu;
pub mod notify;
pub mod restore;
pub mod session;
pub mod wizard;

pub use bot::AdminBot;
pub use notify::TelegramNotifier;
pub use session::{Session, SessionState, SessionStore};
