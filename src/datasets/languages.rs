// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet UI language packs.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::http::{FetchError, SourceClient};
use crate::watch::{Dataset, ShapeError, WatchSettings};

pub const KEY: &str = "languages";

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/GetScatter/ScatterData/master/languages.json";

/// A language pack. Only `name` is interpreted; translations pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguagePack {
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

pub fn names(packs: &[LanguagePack]) -> Vec<String> {
    packs.iter().map(|pack| pack.name.clone()).collect()
}

pub fn find<'a>(packs: &'a [LanguagePack], name: &str) -> Option<&'a LanguagePack> {
    packs.iter().find(|pack| pack.name == name)
}

pub struct LanguagesDataset {
    client: SourceClient,
    url: Url,
}

impl LanguagesDataset {
    pub fn new(client: SourceClient, url: Url) -> Self {
        Self { client, url }
    }

    pub fn settings() -> WatchSettings {
        WatchSettings::new(REFRESH_INTERVAL, FETCH_TIMEOUT)
    }
}

#[async_trait]
impl Dataset for LanguagesDataset {
    type Wire = Vec<LanguagePack>;
    type Payload = Vec<LanguagePack>;

    fn key(&self) -> &str {
        KEY
    }

    async fn fetch(&self) -> Result<Vec<LanguagePack>, FetchError> {
        self.client.get_json(&self.url).await
    }

    /// Drops unnamed packs and duplicate names (first one wins).
    fn shape(&self, wire: Vec<LanguagePack>) -> Result<Vec<LanguagePack>, ShapeError> {
        let mut seen = HashSet::new();
        let packs: Vec<LanguagePack> = wire
            .into_iter()
            .filter(|pack| !pack.name.trim().is_empty())
            .filter(|pack| seen.insert(pack.name.clone()))
            .collect();

        if packs.is_empty() {
            return Err(ShapeError::new("no language packs"));
        }
        Ok(packs)
    }
}
