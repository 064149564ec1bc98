// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh outcome reporting.
//!
//! Refresh failures are never propagated to readers, so this is the only
//! channel through which operators (and tests) see them.

use tracing::{debug, info, warn};

use super::RefreshError;

/// Something that happened during one refresh cycle.
#[derive(Debug)]
pub enum RefreshEvent<'a> {
    /// A fresh payload was persisted and mirrored.
    Refreshed { key: &'a str },
    /// The cycle produced no update.
    Failed {
        key: &'a str,
        error: &'a RefreshError,
    },
    /// The mirror was empty and was seeded from the durable store.
    FallbackLoaded { key: &'a str },
    /// The mirror was empty and the durable store had nothing either.
    FallbackMissing { key: &'a str },
}

pub trait RefreshObserver: Send + Sync {
    fn observe(&self, event: &RefreshEvent<'_>);
}

impl<F> RefreshObserver for F
where
    F: Fn(&RefreshEvent<'_>) + Send + Sync,
{
    fn observe(&self, event: &RefreshEvent<'_>) {
        self(event)
    }
}

/// Observer that turns refresh events into log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RefreshObserver for TracingObserver {
    fn observe(&self, event: &RefreshEvent<'_>) {
        match event {
            RefreshEvent::Refreshed { key } => {
                debug!(dataset = %key, "Dataset refreshed");
            }
            RefreshEvent::Failed { key, error } => {
                warn!(
                    dataset = %key,
                    kind = error.kind(),
                    error = %error,
                    "Dataset refresh failed, keeping current value"
                );
            }
            RefreshEvent::FallbackLoaded { key } => {
                info!(dataset = %key, "Dataset loaded from durable store");
            }
            RefreshEvent::FallbackMissing { key } => {
                warn!(dataset = %key, "Dataset unavailable: no stored copy to fall back on");
            }
        }
    }
}
