// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vpnwarden binary entry point.

mod serve;
mod tasks;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vpnwarden - VPN credential provisioning daemon and admin bot.
#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Cli {
    /// Explicit config file path. Without it the standard hierarchy is
    /// searched (/etc, XDG config dir, working directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the control API, admin bot, and background workers.
    Serve,
    /// Remove expired credentials once and exit.
    Sweep,
    /// Export a credential snapshot once and exit.
    Snapshot,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => warden_config::load_config_from_path(path),
        None => warden_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warden: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Sweep) => tasks::run_sweep(&config).await,
        Some(Commands::Snapshot) => tasks::run_snapshot(&config).await,
        Some(Commands::Serve) | None => serve::run_serve(config).await,
    };

    if let Err(e) = result {
        eprintln!("warden: {e}");
        std::process::exit(1);
    }
}
