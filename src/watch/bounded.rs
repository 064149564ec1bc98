// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Race a fetch against a fixed timeout.

use std::future::Future;
use std::time::Duration;

use crate::http::FetchError;

use super::RefreshError;

/// Run `fetch`, giving up after `timeout`.
///
/// `Err` is the "not available" outcome and carries its cause. On timeout the
/// fetch future is dropped on the spot, so a late response can never touch
/// shared state.
pub async fn bounded_fetch<T, F>(fetch: F, timeout: Duration) -> Result<T, RefreshError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(RefreshError::FetchFailure(e)),
        Err(_) => Err(RefreshError::FetchTimeout(timeout)),
    }
}
