// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Failure kinds a refresh cycle can run into.
//!
//! None of these ever reach a reader of the cache. They are reported to the
//! cache's [`RefreshObserver`](super::RefreshObserver) and the cycle ends
//! without an update.

use std::time::Duration;

use crate::http::FetchError;
use crate::store::StoreError;

/// A fetched payload failed the dataset's own validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ShapeError {
    pub reason: String,
}

impl ShapeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("fetch failed: {0}")]
    FetchFailure(#[from] FetchError),

    #[error("payload rejected: {0}")]
    ShapingRejected(#[from] ShapeError),

    #[error("durable store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("refresh cycle panicked: {0}")]
    CyclePanicked(String),
}

impl RefreshError {
    /// Short machine-readable name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::FetchTimeout(_) => "fetch_timeout",
            RefreshError::FetchFailure(_) => "fetch_failure",
            RefreshError::ShapingRejected(_) => "shaping_rejected",
            RefreshError::StoreUnavailable(_) => "store_unavailable",
            RefreshError::CyclePanicked(_) => "cycle_panicked",
        }
    }
}
