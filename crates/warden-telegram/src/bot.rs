// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher wiring and the admin conversation itself.
//!
//! Every update funnels through two endpoints (messages and callback
//! queries), both gated on the configured admin operator. Rendering
//! replaces the previous panel message: the tracked message is deleted
//! (best-effort) before the new one is sent and tracked. Result messages
//! for completed operations are sent untracked so they stay visible above
//! the refreshed dashboard.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use teloxide::dptree;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Document, InlineKeyboardMarkup, MessageId};
use tracing::{debug, info, warn};
use warden_api::ApiClient;
use warden_config::BotState;
use warden_core::{OperatorId, UserRequest};
use warden_workers::{ExpirySweep, SnapshotExport, SnapshotOutcome};

use crate::dashboard::{self, GeoLookup};
use crate::menu::{self, Callback, SelectAction};
use crate::notify;
use crate::restore;
use crate::session::{SessionState, SessionStore};
use crate::wizard::{self, StepOutcome};

/// Length of generated trial secrets.
const TRIAL_SECRET_LEN: usize = 4;

/// The admin-facing Telegram front-end.
pub struct AdminBot {
    bot: Bot,
    admin: OperatorId,
    client: ApiClient,
    sessions: SessionStore,
    geo: GeoLookup,
    state_path: PathBuf,
    started_at: Instant,
    sweep: Arc<ExpirySweep>,
    snapshot: Arc<SnapshotExport>,
}

impl AdminBot {
    pub fn new(
        bot: Bot,
        admin: OperatorId,
        client: ApiClient,
        state_path: impl Into<PathBuf>,
        sweep: Arc<ExpirySweep>,
        snapshot: Arc<SnapshotExport>,
    ) -> Self {
        Self {
            bot,
            admin,
            client,
            sessions: SessionStore::new(),
            geo: GeoLookup::new(),
            state_path: state_path.into(),
            started_at: Instant::now(),
            sweep,
            snapshot,
        }
    }

    /// Long-polls updates until the process shuts down.
    pub async fn dispatch(self: Arc<Self>) {
        info!("telegram dispatcher starting");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_callback_query().endpoint(on_callback));

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self])
            .default_handler(|_| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    // --- rendering ---

    /// Deletes the tracked panel message, sends a new one, tracks it.
    async fn send_tracked(&self, chat: ChatId, text: &str, keyboard: Option<InlineKeyboardMarkup>) {
        if let Some(message_id) = self.sessions.take_last_rendered(chat.0).await {
            // Stale or already-deleted messages are fine to lose.
            if let Err(e) = self.bot.delete_message(chat, MessageId(message_id)).await {
                debug!(error = %e, "could not delete previous panel message");
            }
        }

        let mut request = self
            .bot
            .send_message(chat, text)
            .parse_mode(notify::MARKDOWN);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }

        match request.await {
            Ok(sent) => self.sessions.set_last_rendered(chat.0, sent.id.0).await,
            Err(e) => warn!(error = %e, "failed to send panel message"),
        }
    }

    /// Untracked send for result messages that should stay visible.
    async fn send_plain(&self, chat: ChatId, text: &str) {
        if let Err(e) = self
            .bot
            .send_message(chat, text)
            .parse_mode(notify::MARKDOWN)
            .await
        {
            warn!(error = %e, "failed to send message");
        }
    }

    /// Wizard prompt with the cancel button attached.
    async fn send_prompt(&self, chat: ChatId, text: &str) {
        self.send_tracked(chat, text, Some(menu::cancel_keyboard()))
            .await;
    }

    async fn show_dashboard(&self, chat: ChatId) {
        // Re-read state so a concurrent group/date update shows up.
        let state = BotState::load(&self.state_path).unwrap_or_else(|e| {
            warn!(error = %e, "could not reload bot state for dashboard");
            BotState::default()
        });

        let domain = match self.client.info().await {
            Ok(info) => info.domain,
            Err(_) => "unknown".to_string(),
        };
        let total = self.client.users().await.map(|u| u.len()).unwrap_or(0);
        let geo = self.geo.lookup().await;
        let uptime = dashboard::format_uptime(self.started_at.elapsed());
        let vps = dashboard::vps_countdown(
            state.vps_expired_date.as_deref(),
            chrono::Local::now().date_naive(),
        );

        let text = dashboard::render(
            &domain,
            &geo,
            total,
            state.notif_group_id,
            &uptime,
            &vps,
        );
        self.send_tracked(chat, &text, Some(menu::main_menu_keyboard()))
            .await;
    }

    async fn show_selection(&self, chat: ChatId, page: usize, action: SelectAction) {
        let users = match self.client.users().await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "listing for selection menu failed");
                self.send_plain(chat, "❌ Could not fetch the account listing.")
                    .await;
                return;
            }
        };

        let Some(window) = menu::paginate(&users, page, action) else {
            self.send_plain(chat, "📂 No accounts yet.").await;
            self.show_dashboard(chat).await;
            return;
        };

        let title = match action {
            SelectAction::Delete => "🗑️ DELETE",
            SelectAction::Renew => "🔄 RENEW",
        };
        let text = format!("*{title}*\nPage {}/{}", window.page, window.total_pages);
        self.send_tracked(chat, &text, Some(menu::selection_keyboard(&window)))
            .await;
    }

    async fn list_accounts(&self, chat: ChatId) {
        let users = match self.client.users().await {
            Ok(users) => users,
            Err(e) => {
                warn!(error = %e, "account listing failed");
                self.send_plain(chat, "❌ Could not fetch the account listing.")
                    .await;
                return;
            }
        };

        if users.is_empty() {
            self.send_plain(chat, "📂 No accounts yet.").await;
            self.show_dashboard(chat).await;
            return;
        }

        let mut text = format!("📋 *ACCOUNTS* (total: {})\n\n", users.len());
        for (i, user) in users.iter().enumerate() {
            let icon = match user.status {
                warden_core::CredentialStatus::Active => "🟢",
                warden_core::CredentialStatus::Expired => "🔴",
            };
            text.push_str(&format!(
                "{}. {icon} `{}`\n    _expires: {}_\n",
                i + 1,
                user.secret,
                user.expires_on
            ));
        }
        self.send_tracked(chat, &text, None).await;
    }

    async fn server_info(&self, chat: ChatId) {
        let info = match self.client.info().await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "system info fetch failed");
                self.send_plain(chat, "❌ Could not fetch the system info.")
                    .await;
                return;
            }
        };
        let geo = self.geo.lookup().await;

        let text = format!(
            "⚙️ *SERVER DETAILS*\n\
             🌐 Domain: `{}`\n\
             🖥️ Public IP: `{}`\n\
             🔌 Port: `{}`\n\
             🔧 Service: `{}`\n\
             📍 Location: `{}`\n\
             📡 ISP: `{}`",
            info.domain, info.public_ip, info.port, info.service, geo.city, geo.isp
        );
        self.send_plain(chat, &text).await;
        self.show_dashboard(chat).await;
    }

    // --- terminal wizard actions ---

    async fn do_create(
        &self,
        chat: ChatId,
        secret: String,
        days: i64,
        limit_ip: String,
        limit_quota: String,
        trial: bool,
    ) {
        let request = UserRequest {
            secret,
            days: Some(days),
            limit_ip: (!limit_ip.is_empty()).then_some(limit_ip.clone()),
            limit_quota: (!limit_quota.is_empty()).then_some(limit_quota.clone()),
        };

        match self.client.create(&request).await {
            Ok(result) => {
                let title = if trial {
                    format!("🎁 *{days}-DAY TRIAL ACCOUNT*")
                } else {
                    "🎉 *ACCOUNT CREATED*".to_string()
                };
                let text = format!(
                    "{title}\n\
                     ━━━━━━━━━━━━━━━━━━━━\n\
                     🔑 Secret: `{}`\n\
                     🌐 Domain: `{}`\n\
                     🗓️ Expires: `{}`\n\
                     🔢 IP limit: `{}`\n\
                     💾 Quota limit: `{}` GB\n\
                     ━━━━━━━━━━━━━━━━━━━━",
                    result.secret,
                    result.domain,
                    result.expires_on,
                    display_limit(&limit_ip),
                    display_limit(&limit_quota),
                );
                self.send_plain(chat, &text).await;
                self.notify_group_masked(&title, &result.secret, &result.domain, &result.expires_on)
                    .await;
            }
            Err(e) => {
                self.send_plain(chat, &format!("❌ Create failed: {e}")).await;
            }
        }
        self.show_dashboard(chat).await;
    }

    /// Masked copy of a create notification for the configured group.
    async fn notify_group_masked(&self, title: &str, secret: &str, domain: &str, expires_on: &str) {
        let state = match BotState::load(&self.state_path) {
            Ok(state) => state,
            Err(_) => return,
        };
        let Some(group) = state.notif_group_id.filter(|id| *id != 0) else {
            return;
        };

        let text = format!(
            "{title}\n\
             ━━━━━━━━━━━━━━━━━━━━\n\
             🔑 Secret: `{}`\n\
             🌐 Domain: `{}`\n\
             🗓️ Expires: `{expires_on}`\n\
             ━━━━━━━━━━━━━━━━━━━━",
            mask(secret),
            mask(domain),
        );
        if let Err(e) = self
            .bot
            .send_message(ChatId(group), text)
            .parse_mode(notify::MARKDOWN)
            .await
        {
            warn!(group, error = %e, "masked group notification failed");
        }
    }

    async fn do_renew(
        &self,
        chat: ChatId,
        secret: String,
        days: i64,
        limit_ip: String,
        limit_quota: String,
    ) {
        let request = UserRequest {
            secret,
            days: Some(days),
            limit_ip: (!limit_ip.is_empty()).then_some(limit_ip.clone()),
            limit_quota: (!limit_quota.is_empty()).then_some(limit_quota.clone()),
        };

        match self.client.renew(&request).await {
            Ok(result) => {
                let domain = match self.client.info().await {
                    Ok(info) => info.domain,
                    Err(_) => "unknown".to_string(),
                };
                let text = format!(
                    "✅ *RENEWED* ({days} days)\n\
                     ━━━━━━━━━━━━━━━━━━━━\n\
                     🔑 Secret: `{}`\n\
                     🌐 Domain: `{domain}`\n\
                     🗓️ New expiry: `{}`\n\
                     ━━━━━━━━━━━━━━━━━━━━",
                    result.secret, result.expires_on
                );
                self.send_plain(chat, &text).await;
            }
            Err(e) => {
                self.send_plain(chat, &format!("❌ Renew failed: {e}")).await;
            }
        }
        self.show_dashboard(chat).await;
    }

    async fn do_delete(&self, chat: ChatId, secret: &str) {
        match self.client.delete(secret).await {
            Ok(()) => {
                self.send_plain(chat, &format!("✅ `{secret}` has been *deleted*."))
                    .await;
            }
            Err(e) => {
                self.send_plain(chat, &format!("❌ Delete failed: {e}")).await;
            }
        }
        self.show_dashboard(chat).await;
    }

    // --- state document updates ---

    async fn persist_group_id(&self, chat: ChatId, group_id: i64) {
        let mut state = match BotState::load(&self.state_path) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "could not read bot state");
                self.send_plain(chat, "❌ Could not read the bot state file.")
                    .await;
                return;
            }
        };
        state.notif_group_id = Some(group_id);
        if let Err(e) = state.save(&self.state_path) {
            warn!(error = %e, "could not save bot state");
            self.send_plain(chat, "❌ Could not save the bot state file.")
                .await;
            return;
        }
        self.send_plain(
            chat,
            &format!("✅ Notification group set to `{group_id}`."),
        )
        .await;
        self.show_dashboard(chat).await;
    }

    async fn persist_vps_date(&self, chat: ChatId, date: &str) {
        let mut state = match BotState::load(&self.state_path) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "could not read bot state");
                self.send_plain(chat, "❌ Could not read the bot state file.")
                    .await;
                return;
            }
        };
        state.vps_expired_date = Some(date.to_string());
        if let Err(e) = state.save(&self.state_path) {
            warn!(error = %e, "could not save bot state");
            self.send_plain(chat, "❌ Could not save the bot state file.")
                .await;
            return;
        }
        self.send_plain(chat, &format!("✅ VPS expiry date set to `{date}`."))
            .await;
        self.show_dashboard(chat).await;
    }

    // --- manual worker triggers ---

    async fn manual_snapshot(&self, chat: ChatId) {
        self.send_plain(chat, "⏳ Taking a snapshot...").await;
        match self.snapshot.run_once().await {
            Ok(SnapshotOutcome::Empty) => {
                self.send_plain(chat, "⚠️ No accounts to snapshot.").await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "manual snapshot failed");
                self.send_plain(chat, &format!("❌ Snapshot failed: {e}")).await;
            }
        }
        self.show_dashboard(chat).await;
    }

    async fn manual_cleanup(&self, chat: ChatId) {
        self.send_plain(chat, "🧹 Removing expired accounts and restarting...")
            .await;
        if let Err(e) = self.sweep.run_once(true).await {
            warn!(error = %e, "manual cleanup failed");
            self.send_plain(chat, &format!("❌ Cleanup failed: {e}")).await;
        }
        self.show_dashboard(chat).await;
    }

    // --- restore upload ---

    async fn handle_restore_upload(&self, chat: ChatId, document: &Document) {
        self.sessions.clear(self.admin).await;
        self.send_plain(chat, "⏳ Downloading and processing the snapshot...")
            .await;

        let bytes = match self.download_document(document).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "snapshot download failed");
                self.send_plain(chat, "❌ Could not download the file from Telegram.")
                    .await;
                return;
            }
        };

        let entries = match restore::parse_snapshot(&bytes) {
            Ok(entries) => entries,
            Err(_) => {
                self.send_plain(chat, "❌ The file is not a valid snapshot JSON array.")
                    .await;
                return;
            }
        };
        if entries.is_empty() {
            self.send_plain(chat, "⚠️ The snapshot file is empty.").await;
            self.show_dashboard(chat).await;
            return;
        }

        self.send_plain(chat, &format!("⏳ Restoring {} entries...", entries.len()))
            .await;
        let summary = restore::restore_entries(
            &self.client,
            &entries,
            chrono::Local::now().naive_local(),
        )
        .await;
        self.send_plain(chat, &summary.render()).await;
        self.show_dashboard(chat).await;
    }

    async fn download_document(&self, document: &Document) -> Result<Vec<u8>, teloxide::RequestError> {
        let file = self.bot.get_file(document.file.id.clone()).await?;
        let mut bytes = Vec::new();
        self.bot.download_file(&file.path, &mut bytes).await?;
        Ok(bytes)
    }
}

fn mask(value: &str) -> String {
    "*".repeat(value.chars().count())
}

fn display_limit(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

// --- dispatcher endpoints ---

async fn on_message(msg: Message, ctx: Arc<AdminBot>) -> ResponseResult<()> {
    let Some(operator) = msg.from.as_ref().map(|u| OperatorId(u.id.0 as i64)) else {
        return Ok(());
    };
    let chat = msg.chat.id;

    if operator != ctx.admin {
        debug!(operator = operator.0, "rejecting non-admin message");
        ctx.send_plain(chat, "⛔ Access denied. You are not the admin.")
            .await;
        return Ok(());
    }

    match ctx.sessions.state_of(operator).await {
        Some(SessionState::WaitRestoreFile) => {
            if let Some(document) = msg.document() {
                ctx.handle_restore_upload(chat, document).await;
            } else {
                ctx.send_prompt(chat, "❌ Please send the snapshot `.json` file.")
                    .await;
            }
        }
        Some(_) => {
            let text = msg.text().unwrap_or_default().to_string();
            let outcome = ctx
                .sessions
                .modify(operator, |session| wizard::advance(session, &text))
                .await;
            if let Some(outcome) = outcome {
                run_outcome(&ctx, chat, operator, outcome).await;
            }
        }
        None => handle_command(&ctx, chat, operator, msg.text().unwrap_or_default()).await,
    }

    Ok(())
}

async fn handle_command(ctx: &AdminBot, chat: ChatId, operator: OperatorId, text: &str) {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();

    match lowered.as_str() {
        "/start" | "/panel" | "/menu" | "panel" | "menu" => {
            ctx.show_dashboard(chat).await;
            return;
        }
        "/setvpsdate" => {
            ctx.sessions.begin(operator, SessionState::SetVpsDate).await;
            ctx.send_prompt(
                chat,
                "📅 *SET VPS EXPIRY*\n\nEnter the expiry date.\nFormat: `YYYY-MM-DD` (example: `2026-12-31`).",
            )
            .await;
            return;
        }
        _ => {}
    }

    if let Some(args) = lowered.strip_prefix("/setgroup") {
        match args.trim().parse::<i64>() {
            Ok(group_id) => ctx.persist_group_id(chat, group_id).await,
            Err(_) => {
                ctx.send_plain(
                    chat,
                    "❌ Usage: `/setgroup <group id>` (example: `/setgroup -1001234567890`).",
                )
                .await;
            }
        }
        return;
    }

    ctx.send_plain(chat, "⚠️ Standing by. Send /panel for the menu.")
        .await;
}

async fn on_callback(query: CallbackQuery, ctx: Arc<AdminBot>) -> ResponseResult<()> {
    let operator = OperatorId(query.from.id.0 as i64);
    if operator != ctx.admin {
        ctx.bot
            .answer_callback_query(query.id.clone())
            .text("Access denied")
            .await?;
        return Ok(());
    }

    let chat = match query.message.as_ref() {
        Some(message) => message.chat().id,
        None => return Ok(()),
    };

    if let Some(callback) = query.data.as_deref().and_then(Callback::parse) {
        match callback {
            Callback::Trial => {
                let secret = wizard::random_secret(TRIAL_SECRET_LEN);
                ctx.sessions
                    .begin_with(
                        operator,
                        SessionState::CreateTrialDuration,
                        &[("secret", &secret), ("limit_ip", "1"), ("limit_quota", "1")],
                    )
                    .await;
                ctx.send_prompt(
                    chat,
                    "🎁 *TRIAL*\nEnter the trial duration.\nExamples: `1h` = 1 hour, `1d` = 1 day, or a bare number of days.",
                )
                .await;
            }
            Callback::Create => {
                ctx.sessions.begin(operator, SessionState::CreateUsername).await;
                ctx.send_prompt(chat, "🔑 *CREATE*\nEnter the *secret*:").await;
            }
            Callback::Delete => ctx.show_selection(chat, 1, SelectAction::Delete).await,
            Callback::Renew => ctx.show_selection(chat, 1, SelectAction::Renew).await,
            Callback::List => ctx.list_accounts(chat).await,
            Callback::Info => ctx.server_info(chat).await,
            Callback::Backup => ctx.manual_snapshot(chat).await,
            Callback::Restore => {
                ctx.sessions.begin(operator, SessionState::WaitRestoreFile).await;
                ctx.send_prompt(chat, "📥 *RESTORE*\nSend the snapshot `.json` file.")
                    .await;
            }
            Callback::SetVpsDate => {
                ctx.sessions.begin(operator, SessionState::SetVpsDate).await;
                ctx.send_prompt(
                    chat,
                    "📅 *SET VPS EXPIRY*\n\nEnter the expiry date.\nFormat: `YYYY-MM-DD` (example: `2026-12-31`).",
                )
                .await;
            }
            Callback::SetGroup => {
                ctx.sessions.begin(operator, SessionState::SetGroupId).await;
                ctx.send_prompt(
                    chat,
                    "🔔 *SET NOTIFICATION GROUP*\n\nEnter the Telegram group id.\nExample: `-1001234567890`.",
                )
                .await;
            }
            Callback::CleanRestart => ctx.manual_cleanup(chat).await,
            Callback::Cancel => {
                ctx.sessions.clear(operator).await;
                ctx.show_dashboard(chat).await;
            }
            Callback::Page { action, page } => ctx.show_selection(chat, page, action).await,
            Callback::Select {
                action: SelectAction::Renew,
                secret,
            } => {
                ctx.sessions
                    .begin_with(operator, SessionState::RenewLimitIp, &[("secret", &secret)])
                    .await;
                ctx.send_prompt(
                    chat,
                    &format!("🔄 *RENEW*\nAccount: `{secret}`\n\nEnter the *IP limit*:"),
                )
                .await;
            }
            Callback::Select {
                action: SelectAction::Delete,
                secret,
            } => {
                ctx.send_tracked(
                    chat,
                    &format!("❓ *CONFIRM DELETE*\nReally delete `{secret}`?"),
                    Some(menu::confirm_delete_keyboard(&secret)),
                )
                .await;
            }
            Callback::ConfirmDelete { secret } => ctx.do_delete(chat, &secret).await,
        }
    }

    ctx.bot.answer_callback_query(query.id).await?;
    Ok(())
}

/// Executes the result of a wizard step. Terminal outcomes clear the
/// session before anything else happens, success or failure.
async fn run_outcome(ctx: &AdminBot, chat: ChatId, operator: OperatorId, outcome: StepOutcome) {
    match outcome {
        StepOutcome::Reprompt(text) | StepOutcome::Prompt(text) => {
            ctx.send_prompt(chat, &text).await;
        }
        StepOutcome::Create {
            secret,
            days,
            limit_ip,
            limit_quota,
            trial,
        } => {
            ctx.sessions.clear(operator).await;
            ctx.do_create(chat, secret, days, limit_ip, limit_quota, trial)
                .await;
        }
        StepOutcome::Renew {
            secret,
            days,
            limit_ip,
            limit_quota,
        } => {
            ctx.sessions.clear(operator).await;
            ctx.do_renew(chat, secret, days, limit_ip, limit_quota).await;
        }
        StepOutcome::SetVpsDate(date) => {
            ctx.sessions.clear(operator).await;
            ctx.persist_vps_date(chat, &date).await;
        }
        StepOutcome::SetGroupId(group_id) => {
            ctx.sessions.clear(operator).await;
            ctx.persist_group_id(chat, group_id).await;
        }
    }
}
