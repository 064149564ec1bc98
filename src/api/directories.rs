// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Explorer, app, proxy and network directory endpoints.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    datasets::{
        directory::{self, BlockchainDirectory, DirectoryEntry},
        DirectoryDataset,
    },
    error::ApiError,
    state::AppState,
    watch::WatchedCache,
};

use super::is_set;

#[derive(Debug, Deserialize, IntoParams)]
pub struct FlatQuery {
    /// Return one list with a `blockchain` field on each entry.
    pub flat: Option<String>,
}

/// Body of `POST /apps`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AppsFilterRequest {
    /// Applinks to select. Empty or missing returns the whole directory.
    #[serde(default)]
    pub apps: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DirectoryView {
    Grouped(BlockchainDirectory),
    Flat(Vec<DirectoryEntry>),
}

fn read_directory(
    cache: &WatchedCache<DirectoryDataset>,
    flat: bool,
) -> Result<Json<DirectoryView>, ApiError> {
    let directory = cache
        .read()
        .ok_or_else(|| ApiError::dataset_unavailable(cache.key()))?;

    let view = if flat {
        DirectoryView::Flat(directory::flatten(&directory))
    } else {
        DirectoryView::Grouped(BlockchainDirectory::clone(&directory))
    };
    Ok(Json(view))
}

/// Block explorers per blockchain.
#[utoipa::path(
    get,
    path = "/explorers",
    params(FlatQuery),
    tag = "Directories",
    responses(
        (status = 200, body = Object),
        (status = 503, description = "Directory not available yet")
    )
)]
pub async fn list_explorers(
    State(state): State<AppState>,
    Query(query): Query<FlatQuery>,
) -> Result<Json<DirectoryView>, ApiError> {
    read_directory(&state.datasets.explorers, is_set(query.flat.as_deref()))
}

/// Proxy (resource provider) accounts per blockchain.
#[utoipa::path(
    get,
    path = "/proxies",
    params(FlatQuery),
    tag = "Directories",
    responses(
        (status = 200, body = Object),
        (status = 503, description = "Directory not available yet")
    )
)]
pub async fn list_proxies(
    State(state): State<AppState>,
    Query(query): Query<FlatQuery>,
) -> Result<Json<DirectoryView>, ApiError> {
    read_directory(&state.datasets.proxies, is_set(query.flat.as_deref()))
}

/// Known networks per blockchain.
#[utoipa::path(
    get,
    path = "/networks",
    params(FlatQuery),
    tag = "Directories",
    responses(
        (status = 200, body = Object),
        (status = 503, description = "Directory not available yet")
    )
)]
pub async fn list_networks(
    State(state): State<AppState>,
    Query(query): Query<FlatQuery>,
) -> Result<Json<DirectoryView>, ApiError> {
    read_directory(&state.datasets.networks, is_set(query.flat.as_deref()))
}

/// Dapps per blockchain.
#[utoipa::path(
    get,
    path = "/apps",
    params(FlatQuery),
    tag = "Directories",
    responses(
        (status = 200, body = Object),
        (status = 503, description = "Directory not available yet")
    )
)]
pub async fn list_apps(
    State(state): State<AppState>,
    Query(query): Query<FlatQuery>,
) -> Result<Json<DirectoryView>, ApiError> {
    read_directory(&state.datasets.apps, is_set(query.flat.as_deref()))
}

/// Look up specific dapps by applink.
///
/// The body is read leniently: a missing, empty or unparsable body selects
/// nothing and returns the whole directory.
#[utoipa::path(
    post,
    path = "/apps",
    request_body = AppsFilterRequest,
    tag = "Directories",
    responses(
        (status = 200, description = "Matching apps, or the whole directory", body = Object),
        (status = 503, description = "Directory not available yet")
    )
)]
pub async fn filter_apps(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DirectoryView>, ApiError> {
    let wanted = serde_json::from_slice::<AppsFilterRequest>(&body)
        .ok()
        .and_then(|request| request.apps)
        .unwrap_or_default();
    if wanted.is_empty() {
        return read_directory(&state.datasets.apps, false);
    }

    let directory = state
        .datasets
        .apps
        .read()
        .ok_or_else(|| ApiError::dataset_unavailable(state.datasets.apps.key()))?;
    Ok(Json(DirectoryView::Flat(directory::select_by_applink(
        &directory, &wanted,
    ))))
}
