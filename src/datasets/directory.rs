// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-blockchain directories: explorers, dapps, proxies and networks.
//!
//! All four share one document shape, a map from blockchain id to a list of
//! entry objects. Entry fields are passed through untouched; only the
//! top-level shape is validated.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

use crate::http::{FetchError, SourceClient};
use crate::watch::{Dataset, ShapeError, WatchSettings};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Base location of the published directory documents.
pub const DEFAULT_SOURCE_BASE_URL: &str =
    "https://raw.githubusercontent.com/GetScatter/ScatterData/master/";

/// One directory entry; `applink`, `name`, `blockchain`, ... as published.
pub type DirectoryEntry = Map<String, Value>;

/// Blockchain id → entries on that chain.
pub type BlockchainDirectory = BTreeMap<String, Vec<DirectoryEntry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    Explorers,
    Apps,
    Proxies,
    Networks,
}

impl DirectoryKind {
    pub const ALL: [DirectoryKind; 4] = [
        DirectoryKind::Explorers,
        DirectoryKind::Apps,
        DirectoryKind::Proxies,
        DirectoryKind::Networks,
    ];

    /// Durable store key.
    pub fn key(self) -> &'static str {
        match self {
            DirectoryKind::Explorers => "explorers",
            DirectoryKind::Apps => "apps",
            DirectoryKind::Proxies => "proxies",
            DirectoryKind::Networks => "networks",
        }
    }

    /// Document name under [`DEFAULT_SOURCE_BASE_URL`].
    pub fn file_name(self) -> &'static str {
        match self {
            DirectoryKind::Explorers => "explorers.json",
            DirectoryKind::Apps => "apps.json",
            DirectoryKind::Proxies => "proxies.json",
            DirectoryKind::Networks => "networks.json",
        }
    }
}

/// Flatten a directory into one list, tagging each entry with its chain
/// unless it already names one.
pub fn flatten(directory: &BlockchainDirectory) -> Vec<DirectoryEntry> {
    directory
        .iter()
        .flat_map(|(blockchain, entries)| {
            entries.iter().map(move |entry| {
                let mut entry = entry.clone();
                entry
                    .entry("blockchain")
                    .or_insert_with(|| Value::String(blockchain.clone()));
                entry
            })
        })
        .collect()
}

/// Flattened entries whose `applink` is one of `applinks`.
pub fn select_by_applink(
    directory: &BlockchainDirectory,
    applinks: &[String],
) -> Vec<DirectoryEntry> {
    flatten(directory)
        .into_iter()
        .filter(|entry| {
            entry
                .get("applink")
                .and_then(Value::as_str)
                .is_some_and(|link| applinks.iter().any(|wanted| wanted == link))
        })
        .collect()
}

pub struct DirectoryDataset {
    kind: DirectoryKind,
    client: SourceClient,
    url: Url,
}

impl DirectoryDataset {
    pub fn new(kind: DirectoryKind, client: SourceClient, url: Url) -> Self {
        Self { kind, client, url }
    }

    pub fn kind(&self) -> DirectoryKind {
        self.kind
    }

    pub fn settings() -> WatchSettings {
        WatchSettings::new(REFRESH_INTERVAL, FETCH_TIMEOUT)
    }
}

#[async_trait]
impl Dataset for DirectoryDataset {
    type Wire = BlockchainDirectory;
    type Payload = BlockchainDirectory;

    fn key(&self) -> &str {
        self.kind.key()
    }

    async fn fetch(&self) -> Result<BlockchainDirectory, FetchError> {
        self.client.get_json(&self.url).await
    }

    /// Chain ids are trimmed and blank ones dropped. Source chains that trim
    /// to the same id are merged, in source key order, and the clash logged.
    fn shape(&self, wire: BlockchainDirectory) -> Result<BlockchainDirectory, ShapeError> {
        let mut directory = BlockchainDirectory::new();

        for (raw_blockchain, entries) in wire {
            let blockchain = raw_blockchain.trim();
            if blockchain.is_empty() {
                continue;
            }
            match directory.entry(blockchain.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(entries);
                }
                Entry::Occupied(mut slot) => {
                    warn!(
                        directory = %self.kind.key(),
                        blockchain = %slot.key(),
                        source_key = %raw_blockchain,
                        "Merging duplicate blockchain entries"
                    );
                    slot.get_mut().extend(entries);
                }
            }
        }

        if directory.is_empty() {
            return Err(ShapeError::new(format!("{} directory is empty", self.kind.key())));
        }
        Ok(directory)
    }
}
