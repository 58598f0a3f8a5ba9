// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for vpnwarden.
//!
//! Two kinds of configuration live here: the static service configuration
//! (TOML via Figment, loaded once at startup) and the admin-mutable
//! bot-state JSON document (reloaded fresh on every use).

pub mod loader;
pub mod model;
pub mod state;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::WardenConfig;
pub use state::BotState;
