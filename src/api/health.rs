// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;
use crate::watch::CacheStatus;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Refresh state of every watched dataset.
    pub datasets: Vec<CacheStatus>,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint handler.
///
/// Returns 200 once every dataset holds a value, 503 otherwise. A dataset
/// that keeps failing to refresh but still serves its last value counts as
/// healthy; its `consecutive_failures` shows the trouble.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let datasets = state.datasets.statuses();
    let all_ok = datasets.iter().all(|status| status.populated);

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            datasets,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::datasets::testing::{spawn_fixture_sources, unreachable_sources};
    use crate::datasets::Datasets;
    use crate::http::SourceClient;
    use crate::store::MemoryStore;
    use crate::watch::TracingObserver;

    fn state_for(sources: &crate::config::SourceUrls) -> AppState {
        AppState::new(Datasets::new(
            sources,
            SourceClient::new().unwrap(),
            Arc::new(MemoryStore::new()),
            Arc::new(TracingObserver),
        ))
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn health_is_ok_once_every_dataset_is_populated() {
        let state = state_for(&spawn_fixture_sources().await);
        state.datasets.start_all().await;

        let (status, Json(body)) = health(State(state.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.datasets.len(), 8);
        state.datasets.stop_all();
    }

    #[tokio::test]
    async fn readiness_reports_degraded_while_datasets_are_empty() {
        let state = state_for(&unreachable_sources());

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert!(body.checks.datasets.iter().all(|d| !d.populated));
    }
}
