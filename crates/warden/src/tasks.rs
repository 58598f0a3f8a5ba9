// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot maintenance commands.
//!
//! `warden sweep` and `warden snapshot` run a single worker pass against a
//! control API that is already serving, then exit. Useful from cron or an
//! interactive shell when the full daemon is managed elsewhere.

use std::sync::Arc;
use std::time::Duration;

use warden_api::{auth, ApiClient};
use warden_config::WardenConfig;
use warden_core::WardenError;
use warden_store::SystemdControl;
use warden_workers::{ExpirySweep, NullNotifier, SnapshotExport, SnapshotOutcome};

use crate::serve::init_tracing;

fn api_client(config: &WardenConfig) -> ApiClient {
    ApiClient::new(
        &config.telegram.api_url,
        auth::load_api_key(&config.api.api_key_file),
    )
}

/// Removes every expired credential, restarting the daemon if anything
/// was deleted.
pub async fn run_sweep(config: &WardenConfig) -> Result<(), WardenError> {
    init_tracing(&config.agent.log_level);

    let sweep = ExpirySweep::new(
        api_client(config),
        Arc::new(NullNotifier),
        Arc::new(SystemdControl::new(&config.service.name)),
        Duration::from_secs(config.workers.sweep_interval_secs),
    );

    let removed = sweep.run_once(true).await?;
    if removed.is_empty() {
        println!("no expired credentials");
    } else {
        println!("removed {} expired credential(s):", removed.len());
        for line in &removed {
            println!("  {line}");
        }
    }
    Ok(())
}

/// Writes one credential snapshot to the configured path.
pub async fn run_snapshot(config: &WardenConfig) -> Result<(), WardenError> {
    init_tracing(&config.agent.log_level);

    let snapshot = SnapshotExport::new(
        api_client(config),
        Arc::new(NullNotifier),
        &config.workers.snapshot_path,
        config.workers.max_attachment_bytes,
        Duration::from_secs(config.workers.snapshot_interval_secs),
    );

    match snapshot.run_once().await? {
        SnapshotOutcome::Empty => println!("no credentials to snapshot"),
        SnapshotOutcome::Delivered { path, bytes } | SnapshotOutcome::TooLarge { path, bytes } => {
            println!("snapshot written to {} ({bytes} bytes)", path.display());
        }
    }
    Ok(())
}
