// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token prices and fiat conversion endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::IntoParams;

use crate::{
    datasets::{
        fiat::{self, FiatRates, CURRENCIES},
        prices::{self, PriceTable, TIMELINE_DATE_FORMAT},
    },
    error::ApiError,
    state::AppState,
};

use super::is_set;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PricesQuery {
    /// Return every quote currency instead of USD only.
    pub v2: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TimelineQuery {
    /// Day as `YYYYMMDD` (UTC). Defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PricesView {
    Usd(BTreeMap<String, f64>),
    Full(PriceTable),
}

/// Supported fiat currency symbols.
#[utoipa::path(
    get,
    path = "/currencies",
    tag = "Prices",
    responses((status = 200, body = [String]))
)]
pub async fn list_currencies() -> Json<Vec<&'static str>> {
    Json(CURRENCIES.to_vec())
}

/// Conversion rates (units per USD) for the supported fiat currencies.
///
/// Answers `null` until the first rates have been loaded.
#[utoipa::path(
    get,
    path = "/currencies/prices",
    tag = "Prices",
    responses(
        (status = 200, description = "Currency code to rate, or null", body = Object)
    )
)]
pub async fn currency_prices(State(state): State<AppState>) -> Json<Option<FiatRates>> {
    Json(
        state
            .datasets
            .fiat
            .read()
            .map(|rates| fiat::supported_rates(&rates)),
    )
}

/// Token prices: USD per symbol, or the full quote table with `v2`.
#[utoipa::path(
    get,
    path = "/prices",
    params(PricesQuery),
    tag = "Prices",
    responses(
        (status = 200, description = "Token prices", body = Object),
        (status = 503, description = "Prices not available yet")
    )
)]
pub async fn get_prices(
    State(state): State<AppState>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<PricesView>, ApiError> {
    let table = state
        .datasets
        .prices
        .read()
        .ok_or_else(|| ApiError::dataset_unavailable(prices::KEY))?;

    let view = if is_set(query.v2.as_deref()) {
        PricesView::Full(PriceTable::clone(&table))
    } else {
        PricesView::Usd(prices::usd_prices(&table))
    };
    Ok(Json(view))
}

/// Hourly price tables recorded on one day, or `null` if none were.
#[utoipa::path(
    get,
    path = "/prices/timeline",
    params(TimelineQuery),
    tag = "Prices",
    responses(
        (status = 200, description = "Hour (UTC) to price table, or null", body = Object),
        (status = 400, description = "Malformed date"),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn price_timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Option<Value>>, ApiError> {
    let date = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, TIMELINE_DATE_FORMAT).map_err(|_| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("invalid date {raw:?}, expected YYYYMMDD"),
            )
        })?,
        None => Utc::now().date_naive(),
    };

    let key = prices::timeline_key(date);
    let timeline = state.datasets.store().get(&key).await.map_err(|err| {
        warn!(key = %key, error = %err, "Failed to read price timeline");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Price timeline unavailable")
    })?;
    Ok(Json(timeline))
}

/// Per-chain token prices. Not served; always `false`.
#[utoipa::path(
    get,
    path = "/prices/{blockchain}/{chain_id}",
    params(
        ("blockchain" = String, Path, description = "Blockchain id, e.g. eos"),
        ("chain_id" = String, Path, description = "Network chain id")
    ),
    tag = "Prices",
    responses((status = 200, body = bool))
)]
pub async fn chain_prices() -> Json<bool> {
    Json(false)
}
