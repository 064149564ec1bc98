// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fiat conversion rates against the US dollar.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::http::{FetchError, SourceClient};
use crate::watch::{Dataset, ShapeError, WatchSettings};

pub const KEY: &str = "fiat";

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_SOURCE_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// Fiat currencies offered to wallet users.
pub const CURRENCIES: [&str; 8] = ["USD", "EUR", "CNY", "GBP", "JPY", "CAD", "CHF", "AUD"];

/// Currency code → units per US dollar.
pub type FiatRates = BTreeMap<String, f64>;

#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub result: Option<String>,
    pub rates: BTreeMap<String, f64>,
}

/// Rates restricted to [`CURRENCIES`]; currencies the source lacks are omitted.
pub fn supported_rates(rates: &FiatRates) -> FiatRates {
    CURRENCIES
        .iter()
        .filter_map(|symbol| rates.get(*symbol).map(|rate| (symbol.to_string(), *rate)))
        .collect()
}

pub struct FiatDataset {
    client: SourceClient,
    url: Url,
}

impl FiatDataset {
    pub fn new(client: SourceClient, url: Url) -> Self {
        Self { client, url }
    }

    pub fn settings() -> WatchSettings {
        WatchSettings::new(REFRESH_INTERVAL, FETCH_TIMEOUT)
    }
}

#[async_trait]
impl Dataset for FiatDataset {
    type Wire = RatesResponse;
    type Payload = FiatRates;

    fn key(&self) -> &str {
        KEY
    }

    async fn fetch(&self) -> Result<RatesResponse, FetchError> {
        self.client.get_json(&self.url).await
    }

    fn shape(&self, wire: RatesResponse) -> Result<FiatRates, ShapeError> {
        if wire.result.as_deref() == Some("error") {
            return Err(ShapeError::new("rate source reported an error"));
        }

        let rates: FiatRates = wire
            .rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(currency, rate)| (currency.to_ascii_uppercase(), rate))
            .collect();

        if rates.is_empty() {
            return Err(ShapeError::new("no usable fiat rates"));
        }
        Ok(rates)
    }
}
