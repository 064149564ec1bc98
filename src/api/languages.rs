// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::{
    datasets::languages::{self, LanguagePack},
    error::ApiError,
    state::AppState,
};

use super::is_set;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LanguagesQuery {
    /// Return only the pack names.
    pub names: Option<String>,
    /// Return the single pack with this exact name (or `null`).
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LanguagesView {
    Names(Vec<String>),
    Single(Option<LanguagePack>),
    All(Vec<LanguagePack>),
}

#[utoipa::path(
    get,
    path = "/languages",
    params(LanguagesQuery),
    tag = "Languages",
    responses(
        (status = 200, description = "Language packs, names, or a single pack", body = Object),
        (status = 503, description = "Language packs not available yet")
    )
)]
pub async fn list_languages(
    State(state): State<AppState>,
    Query(query): Query<LanguagesQuery>,
) -> Result<Json<LanguagesView>, ApiError> {
    let packs = state
        .datasets
        .languages
        .read()
        .ok_or_else(|| ApiError::dataset_unavailable(languages::KEY))?;

    let view = if is_set(query.names.as_deref()) {
        LanguagesView::Names(languages::names(&packs))
    } else if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
        LanguagesView::Single(languages::find(&packs, name).cloned())
    } else {
        LanguagesView::All(packs.to_vec())
    };
    Ok(Json(view))
}
