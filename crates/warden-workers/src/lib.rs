// SPDX-FileCopyrightText: 2026 Vpnwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background reconciliation workers for vpnwarden.
//!
//! Two supervised loops keep the deployment converged with the credential
//! store: the expiry sweep removes lapsed credentials and the snapshot
//! export preserves the current listing off-box. Both run against the
//! control API and report through the [`Notifier`] seam.

pub mod notify;
pub mod snapshot;
pub mod sweep;

pub use notify::{Notifier, NullNotifier};
pub use snapshot::{SnapshotExport, SnapshotOutcome};
pub use sweep::ExpirySweep;
