// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Watched Caches
//!
//! A watched cache keeps one externally sourced dataset in memory and
//! refreshes it on a fixed schedule:
//!
//! ```text
//!  tick ──► bounded_fetch ──► shape ──► store.upsert ──► mirror
//!                 │             │            │
//!                 └──── failure ┴────────────┘
//!                           │
//!                           ▼
//!               mirror empty? ──► store.get ──► mirror
//! ```
//!
//! Readers only ever see the mirror. Failures are reported to a
//! [`RefreshObserver`] and otherwise swallowed.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::http::FetchError;
use crate::store::{DurableStore, StoreResult};

pub mod bounded;
pub mod cache;
pub mod error;
pub mod observer;

pub use bounded::bounded_fetch;
pub use cache::{CachePhase, CacheStatus, CycleOutcome, WatchedCache};
pub use error::{RefreshError, ShapeError};
pub use observer::{RefreshEvent, RefreshObserver, TracingObserver};

/// Shortest refresh period accepted; guards the timer against a zero period.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// One externally sourced dataset: where its value comes from and how the raw
/// response becomes the cached payload.
#[async_trait]
pub trait Dataset: Send + Sync + 'static {
    /// Decoded response from the external source.
    type Wire: Send + 'static;
    /// Value held in the mirror and persisted in the durable store.
    type Payload: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Durable store key. Must not change for the life of the process.
    fn key(&self) -> &str;

    /// One network round trip to the external source.
    async fn fetch(&self) -> Result<Self::Wire, FetchError>;

    /// Turn a wire value into the payload, or reject it as unusable.
    fn shape(&self, wire: Self::Wire) -> Result<Self::Payload, ShapeError>;

    /// Write any documents derived from a fresh payload, under keys other
    /// than [`key`](Dataset::key). Runs before the payload itself is stored;
    /// an error fails the cycle.
    async fn persist_companions(
        &self,
        _store: &dyn DurableStore,
        _payload: &Self::Payload,
    ) -> StoreResult<()> {
        Ok(())
    }
}

/// Schedule and latency bounds of one watched cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    refresh_interval: Duration,
    fetch_timeout: Duration,
}

impl WatchSettings {
    pub fn new(refresh_interval: Duration, fetch_timeout: Duration) -> Self {
        Self {
            refresh_interval: refresh_interval.max(MIN_REFRESH_INTERVAL),
            fetch_timeout,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}
