// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The watched cache state machine.
//!
//! ## Phases
//!
//! ```text
//! Uninitialized ──start()──► Priming ──first cycle done──► Steady
//!                               │                            │
//!                               └────────── stop() ──────────┴──► Stopped
//! ```
//!
//! `start()` returns once the priming cycle has finished, whatever its
//! outcome. Failed cycles never change the phase.
//!
//! ## Scheduling
//!
//! Each cache runs one background task ticking on a fixed grid of
//! `refresh_interval`. Cycles of one cache are serialized on that task; a tick
//! that falls inside a still-running cycle is skipped rather than queued.
//! The grid is anchored at the moment `start()` was called.
//!
//! Every cycle runs on a task of its own. A panic in the dataset or the
//! observer fails that one cycle and the timer carries on.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::store::{DurableStore, StoreError};

use super::{bounded_fetch, Dataset, RefreshError, RefreshEvent, RefreshObserver, WatchSettings};

/// Lifecycle phase of a watched cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CachePhase {
    Uninitialized,
    Priming,
    Steady,
    Stopped,
}

/// What a single refresh cycle did to the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetched, persisted and mirrored a new payload.
    Refreshed,
    /// Fetch failed; the empty mirror was seeded from the durable store.
    FellBack,
    /// Fetch failed; the mirror kept whatever it had (possibly nothing).
    Unchanged,
}

/// Point-in-time view of a cache, for health reporting.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheStatus {
    /// Durable store key of the dataset.
    pub key: String,
    pub phase: CachePhase,
    /// Whether `read()` currently returns a value.
    pub populated: bool,
    /// Completion time of the last successful refresh in this process.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Failed cycles since the last success.
    pub consecutive_failures: u32,
    /// Most recent failure, if the last cycle failed.
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct Health {
    phase: CachePhase,
    last_success_at: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    last_error: Option<String>,
}

/// State shared between the cache handle and its timer task.
struct Shared<D: Dataset> {
    dataset: D,
    store: Arc<dyn DurableStore>,
    observer: Arc<dyn RefreshObserver>,
    settings: WatchSettings,
    mirror: RwLock<Option<Arc<D::Payload>>>,
    health: Mutex<Health>,
}

impl<D: Dataset> Shared<D> {
    fn read(&self) -> Option<Arc<D::Payload>> {
        self.mirror
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_mirror(&self, payload: D::Payload) {
        *self.mirror.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(payload));
    }

    /// Seed the mirror only if nothing has filled it in the meantime.
    fn adopt_if_empty(&self, payload: D::Payload) -> bool {
        let mut mirror = self.mirror.write().unwrap_or_else(PoisonError::into_inner);
        if mirror.is_some() {
            return false;
        }
        *mirror = Some(Arc::new(payload));
        true
    }

    fn health(&self) -> std::sync::MutexGuard<'_, Health> {
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: CachePhase) {
        self.health().phase = phase;
    }

    fn record_failure(&self, error: &RefreshError) {
        let mut health = self.health();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        health.last_error = Some(error.to_string());
    }

    async fn refresh_cycle(&self) -> CycleOutcome {
        let key = self.dataset.key();

        let error = match self.fetch_and_persist().await {
            Ok(()) => {
                let mut health = self.health();
                health.last_success_at = Some(Utc::now());
                health.consecutive_failures = 0;
                health.last_error = None;
                drop(health);

                self.observer.observe(&RefreshEvent::Refreshed { key });
                return CycleOutcome::Refreshed;
            }
            Err(error) => error,
        };

        self.record_failure(&error);
        self.observer.observe(&RefreshEvent::Failed {
            key,
            error: &error,
        });

        if self.read().is_some() {
            return CycleOutcome::Unchanged;
        }

        match self.load_from_store().await {
            Ok(true) => {
                self.observer.observe(&RefreshEvent::FallbackLoaded { key });
                CycleOutcome::FellBack
            }
            Ok(false) => {
                self.observer.observe(&RefreshEvent::FallbackMissing { key });
                CycleOutcome::Unchanged
            }
            Err(error) => {
                self.observer.observe(&RefreshEvent::Failed {
                    key,
                    error: &error,
                });
                CycleOutcome::Unchanged
            }
        }
    }

    /// The only path that advances the durable store.
    async fn fetch_and_persist(&self) -> Result<(), RefreshError> {
        let wire = bounded_fetch(self.dataset.fetch(), self.settings.fetch_timeout()).await?;
        let payload = self.dataset.shape(wire)?;

        self.dataset
            .persist_companions(self.store.as_ref(), &payload)
            .await?;

        let document = serde_json::to_value(&payload).map_err(StoreError::from)?;
        self.store.upsert(self.dataset.key(), document).await?;

        self.replace_mirror(payload);
        Ok(())
    }

    async fn load_from_store(&self) -> Result<bool, RefreshError> {
        let Some(document) = self.store.get(self.dataset.key()).await? else {
            return Ok(false);
        };
        let payload: D::Payload = serde_json::from_value(document).map_err(StoreError::from)?;
        Ok(self.adopt_if_empty(payload))
    }
}

/// In-memory mirror of one dataset, kept fresh by a background timer.
///
/// Dropping the cache cancels its timer.
pub struct WatchedCache<D: Dataset> {
    shared: Arc<Shared<D>>,
    timer: Mutex<Option<CancellationToken>>,
}

impl<D: Dataset> WatchedCache<D> {
    pub fn new(
        dataset: D,
        store: Arc<dyn DurableStore>,
        observer: Arc<dyn RefreshObserver>,
        settings: WatchSettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                dataset,
                store,
                observer,
                settings,
                mirror: RwLock::new(None),
                health: Mutex::new(Health {
                    phase: CachePhase::Uninitialized,
                    last_success_at: None,
                    consecutive_failures: 0,
                    last_error: None,
                }),
            }),
            timer: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        self.shared.dataset.key()
    }

    pub fn settings(&self) -> WatchSettings {
        self.shared.settings
    }

    /// Current mirror. Never performs I/O and never triggers a refresh.
    pub fn read(&self) -> Option<Arc<D::Payload>> {
        self.shared.read()
    }

    pub fn status(&self) -> CacheStatus {
        let health = self.shared.health();
        CacheStatus {
            key: self.key().to_string(),
            phase: health.phase,
            populated: self.shared.read().is_some(),
            last_success_at: health.last_success_at,
            consecutive_failures: health.consecutive_failures,
            last_error: health.last_error.clone(),
        }
    }

    /// Whether a refresh timer is currently armed.
    pub fn is_running(&self) -> bool {
        self.timer_slot()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Run one refresh cycle now. Never fails; see [`CycleOutcome`].
    pub async fn refresh_cycle(&self) -> CycleOutcome {
        run_cycle(&self.shared).await
    }

    /// Prime the mirror with one refresh cycle, then arm the recurring timer.
    ///
    /// Returns after the priming cycle completes. Calling `start()` on a
    /// running cache replaces its timer.
    pub async fn start(&self) {
        let started = Instant::now();
        let token = CancellationToken::new();
        if let Some(previous) = self.timer_slot().replace(token.clone()) {
            previous.cancel();
        }

        self.shared.set_phase(CachePhase::Priming);
        let outcome = run_cycle(&self.shared).await;
        debug!(dataset = %self.key(), ?outcome, "Priming cycle finished");

        // stop() was called while priming
        if token.is_cancelled() {
            return;
        }

        self.shared.set_phase(CachePhase::Steady);
        spawn_timer(Arc::clone(&self.shared), token, started);
    }

    /// Cancel the recurring timer. A cycle already in flight runs to
    /// completion. No-op when no timer is armed.
    pub fn stop(&self) {
        if let Some(token) = self.timer_slot().take() {
            token.cancel();
            self.shared.set_phase(CachePhase::Stopped);
        }
    }

    fn timer_slot(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: Dataset> Drop for WatchedCache<D> {
    fn drop(&mut self) {
        if let Some(token) = self.timer_slot().take() {
            token.cancel();
        }
    }
}

/// Run one cycle on its own task so that a panic ends only that cycle.
async fn run_cycle<D: Dataset>(shared: &Arc<Shared<D>>) -> CycleOutcome {
    let task = tokio::spawn({
        let shared = Arc::clone(shared);
        async move { shared.refresh_cycle().await }
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(join_error) => {
            let error = RefreshError::CyclePanicked(panic_message(join_error));
            shared.record_failure(&error);
            error!(
                dataset = %shared.dataset.key(),
                error = %error,
                "Refresh cycle aborted"
            );
            CycleOutcome::Unchanged
        }
    }
}

fn panic_message(join_error: tokio::task::JoinError) -> String {
    match join_error.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
        Err(_) => "cycle task cancelled".to_string(),
    }
}

fn spawn_timer<D: Dataset>(shared: Arc<Shared<D>>, token: CancellationToken, started: Instant) {
    let period = shared.settings.refresh_interval();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    run_cycle(&shared).await;
                }
            }
        }

        debug!(dataset = %shared.dataset.key(), "Refresh timer stopped");
    });
}
