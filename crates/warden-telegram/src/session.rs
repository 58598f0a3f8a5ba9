// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-operator conversation state.
//!
//! Each operator gets at most one live [`Session`]: an explicit wizard
//! state plus a scratch map holding the answers collected so far. Sessions
//! live only in memory and are cleared wholesale when a wizard completes,
//! is cancelled, or fails. The store also tracks the last rendered panel
//! message per chat so renders can replace it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use warden_core::OperatorId;

/// Wizard step the operator is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    CreateUsername,
    CreateLimitIp,
    CreateLimitQuota,
    CreateDays,
    CreateTrialDuration,
    RenewLimitIp,
    RenewLimitQuota,
    RenewDays,
    SetVpsDate,
    SetGroupId,
    WaitRestoreFile,
}

/// One operator's in-flight wizard.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    pub scratch: HashMap<String, String>,
}

impl Session {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            scratch: HashMap::new(),
        }
    }
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<OperatorId, Session>,
    last_rendered: HashMap<i64, i32>,
}

/// Concurrent session store shared across dispatcher handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wizard step for the operator, if any.
    pub async fn state_of(&self, operator: OperatorId) -> Option<SessionState> {
        self.inner.read().await.sessions.get(&operator).map(|s| s.state)
    }

    /// Starts a fresh session, discarding any previous one.
    pub async fn begin(&self, operator: OperatorId, state: SessionState) {
        self.inner
            .write()
            .await
            .sessions
            .insert(operator, Session::new(state));
    }

    /// Starts a fresh session pre-seeded with scratch values.
    pub async fn begin_with(
        &self,
        operator: OperatorId,
        state: SessionState,
        scratch: &[(&str, &str)],
    ) {
        let mut session = Session::new(state);
        for (key, value) in scratch {
            session.scratch.insert((*key).to_string(), (*value).to_string());
        }
        self.inner.write().await.sessions.insert(operator, session);
    }

    /// Runs `f` against the operator's session, if one exists.
    pub async fn modify<T>(
        &self,
        operator: OperatorId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Option<T> {
        self.inner
            .write()
            .await
            .sessions
            .get_mut(&operator)
            .map(f)
    }

    /// Drops the operator's session entirely.
    pub async fn clear(&self, operator: OperatorId) {
        self.inner.write().await.sessions.remove(&operator);
    }

    /// Records the id of the panel message just rendered into a chat.
    pub async fn set_last_rendered(&self, chat_id: i64, message_id: i32) {
        self.inner
            .write()
            .await
            .last_rendered
            .insert(chat_id, message_id);
    }

    /// Removes and returns the tracked panel message for a chat.
    pub async fn take_last_rendered(&self, chat_id: i64) -> Option<i32> {
        self.inner.write().await.last_rendered.remove(&chat_id)
    }
}
