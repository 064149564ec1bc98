// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token prices from a multi-symbol price oracle.
//!
//! The oracle answers with `{SYMBOL: {CURRENCY: price}}`. Oracle-level errors
//! come back as a 200 with a string `Response` field, which does not decode
//! as a price table and is therefore a fetch failure.
//!
//! Every successful refresh also records the table into a per-day timeline
//! document (`prices:YYYYMMDD`, UTC), one entry per hour of the day. The
//! latest refresh within an hour wins.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;
use url::Url;

use crate::http::{FetchError, SourceClient};
use crate::store::{DurableStore, StoreError, StoreResult};
use crate::watch::{Dataset, ShapeError, WatchSettings};

pub const KEY: &str = "prices";

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_SOURCE_URL: &str = "https://min-api.cryptocompare.com/data/pricemulti?fsyms=BTC,ETH,EOS,TRX&tsyms=USD,EUR,CNY,GBP,JPY,CAD,CHF,AUD";

/// Symbol → quote currency → price.
pub type PriceTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Prices quoted in US dollars, per symbol.
pub fn usd_prices(table: &PriceTable) -> BTreeMap<String, f64> {
    table
        .iter()
        .filter_map(|(symbol, quotes)| quotes.get("USD").map(|usd| (symbol.clone(), *usd)))
        .collect()
}

/// Hour of day (`00`..`23`, UTC) → price table recorded during that hour.
pub type PriceTimeline = BTreeMap<String, PriceTable>;

/// Date format of timeline keys and of the `date` query parameter.
pub const TIMELINE_DATE_FORMAT: &str = "%Y%m%d";

pub fn timeline_key(date: NaiveDate) -> String {
    format!("{KEY}:{}", date.format(TIMELINE_DATE_FORMAT))
}

/// Put `table` into `timeline` at the hour of `at`.
pub fn record_snapshot(timeline: &mut PriceTimeline, at: DateTime<Utc>, table: &PriceTable) {
    timeline.insert(at.format("%H").to_string(), table.clone());
}

pub struct PricesDataset {
    client: SourceClient,
    url: Url,
}

impl PricesDataset {
    pub fn new(client: SourceClient, url: Url) -> Self {
        Self { client, url }
    }

    pub fn settings() -> WatchSettings {
        WatchSettings::new(REFRESH_INTERVAL, FETCH_TIMEOUT)
    }
}

#[async_trait]
impl Dataset for PricesDataset {
    type Wire = PriceTable;
    type Payload = PriceTable;

    fn key(&self) -> &str {
        KEY
    }

    async fn fetch(&self) -> Result<PriceTable, FetchError> {
        self.client.get_json(&self.url).await
    }

    /// Symbols and currencies are upper-cased. When two source keys fold
    /// onto the same name, the first one (in source key order) keeps each
    /// quote and the clash is logged.
    fn shape(&self, wire: PriceTable) -> Result<PriceTable, ShapeError> {
        let mut table = PriceTable::new();

        for (raw_symbol, raw_quotes) in wire {
            let symbol = raw_symbol.trim().to_ascii_uppercase();
            if symbol.is_empty() {
                continue;
            }
            let quotes = table.entry(symbol.clone()).or_default();

            for (raw_currency, price) in raw_quotes {
                if !price.is_finite() || price < 0.0 {
                    continue;
                }
                match quotes.entry(raw_currency.to_ascii_uppercase()) {
                    Entry::Vacant(slot) => {
                        slot.insert(price);
                    }
                    Entry::Occupied(slot) => {
                        warn!(
                            symbol = %symbol,
                            source_symbol = %raw_symbol,
                            currency = %slot.key(),
                            "Duplicate price quote ignored"
                        );
                    }
                }
            }
        }
        table.retain(|_, quotes| !quotes.is_empty());

        if table.is_empty() {
            return Err(ShapeError::new("price table is empty"));
        }
        Ok(table)
    }

    async fn persist_companions(
        &self,
        store: &dyn DurableStore,
        table: &PriceTable,
    ) -> StoreResult<()> {
        let now = Utc::now();
        let key = timeline_key(now.date_naive());

        let mut timeline: PriceTimeline = match store.get(&key).await? {
            Some(document) => serde_json::from_value(document).unwrap_or_else(|err| {
                warn!(key = %key, error = %err, "Discarding unreadable price timeline");
                PriceTimeline::new()
            }),
            None => PriceTimeline::new(),
        };
        record_snapshot(&mut timeline, now, table);

        let document = serde_json::to_value(&timeline).map_err(StoreError::from)?;
        store.upsert(&key, document).await
    }
}
