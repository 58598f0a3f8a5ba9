// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inline keyboards and callback data.
//!
//! Callback payloads are a tiny wire format of their own
//! (`menu_*`, `page_<action>:<n>`, `select_<action>:<secret>`,
//! `confirm_delete:<secret>`, `cancel`), so encode/parse lives here as a
//! typed enum with the keyboard builders around it.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use warden_core::{CredentialStatus, UserEntry};

/// Credentials per selection page.
pub const PAGE_SIZE: usize = 10;

/// Which lifecycle operation a selection menu is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Delete,
    Renew,
}

impl SelectAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectAction::Delete => "delete",
            SelectAction::Renew => "renew",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "delete" => Some(SelectAction::Delete),
            "renew" => Some(SelectAction::Renew),
            _ => None,
        }
    }
}

/// Decoded callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Trial,
    Create,
    Delete,
    Renew,
    List,
    Info,
    Backup,
    Restore,
    SetVpsDate,
    SetGroup,
    CleanRestart,
    Cancel,
    Page { action: SelectAction, page: usize },
    Select { action: SelectAction, secret: String },
    ConfirmDelete { secret: String },
}

impl Callback {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "menu_trial" => return Some(Callback::Trial),
            "menu_create" => return Some(Callback::Create),
            "menu_delete" => return Some(Callback::Delete),
            "menu_renew" => return Some(Callback::Renew),
            "menu_list" => return Some(Callback::List),
            "menu_info" => return Some(Callback::Info),
            "menu_backup" => return Some(Callback::Backup),
            "menu_restore" => return Some(Callback::Restore),
            "menu_set_vps_date" => return Some(Callback::SetVpsDate),
            "menu_set_group" => return Some(Callback::SetGroup),
            "menu_clean_restart" => return Some(Callback::CleanRestart),
            "cancel" => return Some(Callback::Cancel),
            _ => {}
        }

        if let Some(rest) = data.strip_prefix("page_") {
            let (action, page) = rest.split_once(':')?;
            return Some(Callback::Page {
                action: SelectAction::parse(action)?,
                page: page.parse().ok()?,
            });
        }
        if let Some(rest) = data.strip_prefix("select_") {
            let (action, secret) = rest.split_once(':')?;
            return Some(Callback::Select {
                action: SelectAction::parse(action)?,
                secret: secret.to_string(),
            });
        }
        if let Some(secret) = data.strip_prefix("confirm_delete:") {
            return Some(Callback::ConfirmDelete {
                secret: secret.to_string(),
            });
        }

        None
    }

    pub fn encode(&self) -> String {
        match self {
            Callback::Trial => "menu_trial".into(),
            Callback::Create => "menu_create".into(),
            Callback::Delete => "menu_delete".into(),
            Callback::Renew => "menu_renew".into(),
            Callback::List => "menu_list".into(),
            Callback::Info => "menu_info".into(),
            Callback::Backup => "menu_backup".into(),
            Callback::Restore => "menu_restore".into(),
            Callback::SetVpsDate => "menu_set_vps_date".into(),
            Callback::SetGroup => "menu_set_group".into(),
            Callback::CleanRestart => "menu_clean_restart".into(),
            Callback::Cancel => "cancel".into(),
            Callback::Page { action, page } => format!("page_{}:{page}", action.as_str()),
            Callback::Select { action, secret } => {
                format!("select_{}:{secret}", action.as_str())
            }
            Callback::ConfirmDelete { secret } => format!("confirm_delete:{secret}"),
        }
    }
}

/// One clamped window of the credential listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPage {
    pub page: usize,
    pub total_pages: usize,
    /// `(label, callback data)` per credential row.
    pub rows: Vec<(String, String)>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Computes the selection window for `page` (1-based, clamped into range).
/// Returns `None` for an empty listing.
pub fn paginate(users: &[UserEntry], page: usize, action: SelectAction) -> Option<SelectionPage> {
    if users.is_empty() {
        return None;
    }

    let total_pages = users.len().div_ceil(PAGE_SIZE);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(users.len());

    let rows = users[start..end]
        .iter()
        .map(|u| {
            let icon = match u.status {
                CredentialStatus::Active => "🟢",
                CredentialStatus::Expired => "🔴",
            };
            let label = format!("{icon} {} ({})", u.secret, u.expires_on);
            let data = Callback::Select {
                action,
                secret: u.secret.clone(),
            }
            .encode();
            (label, data)
        })
        .collect();

    let prev = (page > 1).then(|| Callback::Page { action, page: page - 1 }.encode());
    let next = (page < total_pages).then(|| Callback::Page { action, page: page + 1 }.encode());

    Some(SelectionPage {
        page,
        total_pages,
        rows,
        prev,
        next,
    })
}

/// The main dashboard keyboard.
pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    let row = |buttons: Vec<(&str, Callback)>| {
        buttons
            .into_iter()
            .map(|(label, cb)| InlineKeyboardButton::callback(label, cb.encode()))
            .collect::<Vec<_>>()
    };

    InlineKeyboardMarkup::new(vec![
        row(vec![
            ("🎁 Trial account", Callback::Trial),
            ("➕ Create account", Callback::Create),
        ]),
        row(vec![
            ("🔄 Renew account", Callback::Renew),
            ("🗑️ Delete account", Callback::Delete),
        ]),
        row(vec![
            ("📋 List accounts", Callback::List),
            ("📊 Server info", Callback::Info),
        ]),
        row(vec![
            ("💾 Snapshot", Callback::Backup),
            ("♻️ Restore", Callback::Restore),
        ]),
        row(vec![
            ("⚠️ Set VPS expiry", Callback::SetVpsDate),
            ("🔔 Set group", Callback::SetGroup),
        ]),
        row(vec![(
            "🗑️ Remove expired & restart",
            Callback::CleanRestart,
        )]),
    ])
}

/// Keyboard for a selection page: one row per credential, nav row, menu row.
pub fn selection_keyboard(page: &SelectionPage) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = page
        .rows
        .iter()
        .map(|(label, data)| vec![InlineKeyboardButton::callback(label.clone(), data.clone())])
        .collect();

    let mut nav = Vec::new();
    if let Some(ref prev) = page.prev {
        nav.push(InlineKeyboardButton::callback("⬅️ Prev", prev.clone()));
    }
    if let Some(ref next) = page.next {
        nav.push(InlineKeyboardButton::callback("Next ➡️", next.clone()));
    }
    if !nav.is_empty() {
        rows.push(nav);
    }

    rows.push(vec![InlineKeyboardButton::callback(
        "⬅️ Menu",
        Callback::Cancel.encode(),
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// Yes/cancel keyboard for the delete confirmation step.
pub fn confirm_delete_keyboard(secret: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "✅ Yes, delete",
            Callback::ConfirmDelete {
                secret: secret.to_string(),
            }
            .encode(),
        ),
        InlineKeyboardButton::callback("❌ Cancel", Callback::Cancel.encode()),
    ]])
}

/// Lone cancel button shown under wizard prompts.
pub fn cancel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "❌ Cancel",
        Callback::Cancel.encode(),
    )]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(n: usize) -> Vec<UserEntry> {
        (0..n)
            .map(|i| UserEntry {
                secret: format!("user{i}"),
                expires_on: "2026-09-01".into(),
                status: if i % 2 == 0 {
                    CredentialStatus::Active
                } else {
                    CredentialStatus::Expired
                },
            })
            .collect()
    }

    #[test]
    fn callback_round_trips() {
        let cases = [
            Callback::Trial,
            Callback::Cancel,
            Callback::CleanRestart,
            Callback::Page {
                action: SelectAction::Renew,
                page: 3,
            },
            Callback::Select {
                action: SelectAction::Delete,
                secret: "abc123".into(),
            },
            Callback::ConfirmDelete {
                secret: "abc123".into(),
            },
        ];
        for case in cases {
            assert_eq!(Callback::parse(&case.encode()), Some(case));
        }
    }

    #[test]
    fn unknown_callback_is_rejected() {
        assert_eq!(Callback::parse("menu_bogus"), None);
        assert_eq!(Callback::parse("page_delete"), None);
        assert_eq!(Callback::parse("page_nope:1"), None);
        assert_eq!(Callback::parse(""), None);
    }

    #[test]
    fn first_page_has_no_prev() {
        let page = paginate(&users(25), 1, SelectAction::Delete).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), PAGE_SIZE);
        assert!(page.prev.is_none());
        assert_eq!(page.next.as_deref(), Some("page_delete:2"));
    }

    #[test]
    fn last_page_has_no_next_and_holds_the_remainder() {
        let page = paginate(&users(25), 3, SelectAction::Renew).unwrap();
        assert_eq!(page.rows.len(), 5);
        assert_eq!(page.prev.as_deref(), Some("page_renew:2"));
        assert!(page.next.is_none());
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let page = paginate(&users(25), 99, SelectAction::Delete).unwrap();
        assert_eq!(page.page, 3);
        let page = paginate(&users(25), 0, SelectAction::Delete).unwrap();
        assert_eq!(page.page, 1);
    }

    #[test]
    fn empty_listing_has_no_page() {
        assert!(paginate(&[], 1, SelectAction::Delete).is_none());
    }

    #[test]
    fn row_labels_carry_status_and_expiry() {
        let page = paginate(&users(2), 1, SelectAction::Delete).unwrap();
        assert_eq!(page.rows[0].0, "🟢 user0 (2026-09-01)");
        assert_eq!(page.rows[1].0, "🔴 user1 (2026-09-01)");
        assert_eq!(page.rows[0].1, "select_delete:user0");
    }
}
