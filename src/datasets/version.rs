// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Latest desktop wallet release, sourced from the GitHub releases API.
//!
//! Pre-releases are never published to clients: a latest release flagged as
//! `prerelease` is rejected and the previously cached stable release stays
//! in place.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::http::{FetchError, SourceClient};
use crate::watch::{Dataset, ShapeError, WatchSettings};

pub const KEY: &str = "version";

/// Once every 12 hours.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);

pub const FETCH_TIMEOUT: Duration = Duration::from_millis(2500);

pub const DEFAULT_SOURCE_URL: &str =
    "https://api.github.com/repos/GetScatter/ScatterDesktop/releases/latest";

/// Link used for a platform with no matching release asset.
const MISSING_ASSET: &str = "#";

/// Release metadata served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VersionInfo {
    /// Release tag, e.g. `v11.0.1`.
    pub version: String,
    /// macOS installer asset link.
    #[serde(default = "missing_asset")]
    pub mac: String,
    /// Windows installer asset link.
    #[serde(default = "missing_asset")]
    pub win: String,
    /// Linux package asset link.
    #[serde(default = "missing_asset")]
    pub linux: String,
    /// Release notes (markdown).
    #[serde(default)]
    pub details: Option<String>,
}

fn missing_asset() -> String {
    MISSING_ASSET.to_string()
}

/// Subset of a GitHub release object.
#[derive(Debug, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub url: String,
}

impl GithubRelease {
    fn asset_link(&self, needle: &str) -> String {
        self.assets
            .iter()
            .find(|asset| asset.name.contains(needle))
            .map(|asset| asset.url.clone())
            .unwrap_or_else(missing_asset)
    }
}

pub struct VersionDataset {
    client: SourceClient,
    url: Url,
}

impl VersionDataset {
    pub fn new(client: SourceClient, url: Url) -> Self {
        Self { client, url }
    }

    pub fn settings() -> WatchSettings {
        WatchSettings::new(REFRESH_INTERVAL, FETCH_TIMEOUT)
    }
}

#[async_trait]
impl Dataset for VersionDataset {
    type Wire = GithubRelease;
    type Payload = VersionInfo;

    fn key(&self) -> &str {
        KEY
    }

    async fn fetch(&self) -> Result<GithubRelease, FetchError> {
        self.client.get_json(&self.url).await
    }

    fn shape(&self, release: GithubRelease) -> Result<VersionInfo, ShapeError> {
        if release.prerelease {
            return Err(ShapeError::new(format!(
                "release {} is a prerelease",
                release.tag_name
            )));
        }

        Ok(VersionInfo {
            mac: release.asset_link("mac-"),
            win: release.asset_link("win-"),
            linux: release.asset_link("linux-"),
            version: release.tag_name,
            details: release.body,
        })
    }
}
