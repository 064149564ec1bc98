// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    datasets::version::{self, VersionInfo},
    error::ApiError,
    state::AppState,
};

/// Latest stable desktop wallet release.
#[utoipa::path(
    get,
    path = "/version",
    tag = "Version",
    responses(
        (status = 200, description = "Latest stable release", body = VersionInfo),
        (status = 503, description = "Release data not available yet")
    )
)]
pub async fn get_version(State(state): State<AppState>) -> Result<Json<VersionInfo>, ApiError> {
    let info = state
        .datasets
        .version
        .read()
        .ok_or_else(|| ApiError::dataset_unavailable(version::KEY))?;
    Ok(Json(VersionInfo::clone(&info)))
}
