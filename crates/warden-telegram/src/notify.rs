// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`Notifier`] implementation over a Telegram chat.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode};
use warden_core::WardenError;
use warden_workers::Notifier;

/// Legacy Markdown mode, kept on purpose: the panel text leans on
/// single-character `*bold*` and backtick spans that MarkdownV2 would
/// require escaping throughout.
#[allow(deprecated)]
pub(crate) const MARKDOWN: ParseMode = ParseMode::Markdown;

/// Delivers worker reports to a fixed Telegram chat (the admin).
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat: ChatId) -> Self {
        Self { bot, chat }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, text: &str) -> Result<(), WardenError> {
        self.bot
            .send_message(self.chat, text)
            .parse_mode(MARKDOWN)
            .await
            .map_err(|e| WardenError::Upstream {
                message: format!("failed to send notification: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn send_document(&self, path: &Path, caption: &str) -> Result<(), WardenError> {
        self.bot
            .send_document(self.chat, InputFile::file(path))
            .caption(caption)
            .parse_mode(MARKDOWN)
            .await
            .map_err(|e| WardenError::Upstream {
                message: format!("failed to send document: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}
