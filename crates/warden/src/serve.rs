// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `warden serve` command implementation.
//!
//! Starts the full deployment: the authenticated control API, the expiry
//! sweep and snapshot export workers, and the Telegram admin bot in the
//! foreground. Everything shares one cancellation token so a signal winds
//! the whole process down together.

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use warden_api::{auth, ApiClient, ApiState, AuthConfig, ServerConfig, SystemInfoSource};
use warden_config::{BotState, WardenConfig};
use warden_core::{OperatorId, ServiceControl, WardenError};
use warden_store::{AccessConfigFile, CredentialFile, Lifecycle, SystemdControl};
use warden_telegram::{AdminBot, TelegramNotifier};
use warden_workers::{ExpirySweep, SnapshotExport};

/// Initializes the tracing subscriber from `RUST_LOG` or the configured
/// log level applied to every workspace crate.
pub fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "warden={log_level},warden_core={log_level},warden_config={log_level},\
             warden_store={log_level},warden_api={log_level},warden_workers={log_level},\
             warden_telegram={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Installs SIGINT/SIGTERM handlers that cancel the returned token.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for ctrl-c");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("ctrl-c received"),
            _ = terminate => info!("SIGTERM received"),
        }
        handler_token.cancel();
    });

    token
}

/// Runs the `warden serve` command until a shutdown signal arrives.
pub async fn run_serve(config: WardenConfig) -> Result<(), WardenError> {
    init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "starting warden serve");

    let state = BotState::load(&config.telegram.bot_state_path).map_err(|e| {
        WardenError::Config(format!(
            "cannot load bot state from {}: {e}",
            config.telegram.bot_state_path
        ))
    })?;
    if state.bot_token.is_empty() {
        return Err(WardenError::Config(
            "bot state has an empty bot_token".to_string(),
        ));
    }
    if state.admin_id == 0 {
        return Err(WardenError::Config(
            "bot state has no admin_id".to_string(),
        ));
    }

    let control: Arc<dyn ServiceControl> = Arc::new(SystemdControl::new(&config.service.name));
    let lifecycle = Arc::new(Lifecycle::new(
        CredentialFile::new(&config.store.credential_file),
        AccessConfigFile::new(&config.store.access_config),
        &config.store.domain_file,
        Arc::clone(&control),
    ));
    let info_source = Arc::new(SystemInfoSource::new(
        &config.store.domain_file,
        &config.service.name,
        config.service.port,
    ));

    // Control API in the background. A bind failure here is fatal for the
    // whole process only indirectly: the bot and workers would fail on
    // every call, so it is logged loudly.
    let server_config = ServerConfig {
        host: config.api.host.clone(),
        port: config.api.port,
    };
    let api_key = auth::load_api_key(&config.api.api_key_file);
    let auth_config = AuthConfig::new(api_key.clone());
    let api_state = ApiState {
        lifecycle,
        info: info_source,
    };
    tokio::spawn(async move {
        if let Err(e) = warden_api::start_server(&server_config, auth_config, api_state).await {
            error!(error = %e, "control API server exited");
        }
    });

    let client = ApiClient::new(&config.telegram.api_url, api_key);
    let bot = Bot::new(state.bot_token.clone());
    let notifier = Arc::new(TelegramNotifier::new(bot.clone(), ChatId(state.admin_id)));

    let sweep = Arc::new(ExpirySweep::new(
        client.clone(),
        notifier.clone(),
        control,
        Duration::from_secs(config.workers.sweep_interval_secs),
    ));
    let snapshot = Arc::new(SnapshotExport::new(
        client.clone(),
        notifier,
        &config.workers.snapshot_path,
        config.workers.max_attachment_bytes,
        Duration::from_secs(config.workers.snapshot_interval_secs),
    ));

    let cancel = install_signal_handler();
    let sweep_task = Arc::clone(&sweep).spawn(cancel.clone());
    let snapshot_task = Arc::clone(&snapshot).spawn(cancel.clone());

    let admin = Arc::new(AdminBot::new(
        bot,
        OperatorId(state.admin_id),
        client,
        &config.telegram.bot_state_path,
        sweep,
        snapshot,
    ));

    tokio::select! {
        _ = admin.dispatch() => info!("telegram dispatcher stopped"),
        _ = cancel.cancelled() => info!("shutdown signal received"),
    }

    cancel.cancel();
    let _ = sweep_task.await;
    let _ = snapshot_task.await;
    info!("warden serve shut down");
    Ok(())
}
