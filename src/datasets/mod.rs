// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Datasets
//!
//! Every externally sourced dataset the gateway serves, each bound to its own
//! [`WatchedCache`]:
//!
//! | Dataset | Store key | Refresh | Fetch timeout |
//! |---------|-----------|---------|---------------|
//! | release version | `version` | 12 h | 2.5 s |
//! | token prices | `prices` | 5 min | 5 s |
//! | fiat rates | `fiat` | 1 h | 5 s |
//! | explorers / apps / proxies / networks | same as name | 30 min | 5 s |
//! | language packs | `languages` | 30 min | 5 s |

use std::sync::Arc;

use tracing::info;

use crate::config::SourceUrls;
use crate::http::SourceClient;
use crate::store::DurableStore;
use crate::watch::{CacheStatus, RefreshObserver, WatchedCache};

pub mod directory;
pub mod fiat;
pub mod languages;
pub mod prices;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use directory::{DirectoryDataset, DirectoryKind};
pub use fiat::FiatDataset;
pub use languages::LanguagesDataset;
pub use prices::PricesDataset;
pub use version::VersionDataset;

/// Handles to every watched dataset. Cheap to clone.
#[derive(Clone)]
pub struct Datasets {
    pub version: Arc<WatchedCache<VersionDataset>>,
    pub prices: Arc<WatchedCache<PricesDataset>>,
    pub fiat: Arc<WatchedCache<FiatDataset>>,
    pub explorers: Arc<WatchedCache<DirectoryDataset>>,
    pub apps: Arc<WatchedCache<DirectoryDataset>>,
    pub proxies: Arc<WatchedCache<DirectoryDataset>>,
    pub networks: Arc<WatchedCache<DirectoryDataset>>,
    pub languages: Arc<WatchedCache<LanguagesDataset>>,
    store: Arc<dyn DurableStore>,
}

impl Datasets {
    /// Build (but do not start) every dataset cache over one shared store.
    pub fn new(
        sources: &SourceUrls,
        client: SourceClient,
        store: Arc<dyn DurableStore>,
        observer: Arc<dyn RefreshObserver>,
    ) -> Self {
        let directory = |kind: DirectoryKind, url: &url::Url| {
            Arc::new(WatchedCache::new(
                DirectoryDataset::new(kind, client.clone(), url.clone()),
                Arc::clone(&store),
                Arc::clone(&observer),
                DirectoryDataset::settings(),
            ))
        };

        Self {
            version: Arc::new(WatchedCache::new(
                VersionDataset::new(client.clone(), sources.version.clone()),
                Arc::clone(&store),
                Arc::clone(&observer),
                VersionDataset::settings(),
            )),
            prices: Arc::new(WatchedCache::new(
                PricesDataset::new(client.clone(), sources.prices.clone()),
                Arc::clone(&store),
                Arc::clone(&observer),
                PricesDataset::settings(),
            )),
            fiat: Arc::new(WatchedCache::new(
                FiatDataset::new(client.clone(), sources.fiat.clone()),
                Arc::clone(&store),
                Arc::clone(&observer),
                FiatDataset::settings(),
            )),
            explorers: directory(DirectoryKind::Explorers, &sources.explorers),
            apps: directory(DirectoryKind::Apps, &sources.apps),
            proxies: directory(DirectoryKind::Proxies, &sources.proxies),
            networks: directory(DirectoryKind::Networks, &sources.networks),
            languages: Arc::new(WatchedCache::new(
                LanguagesDataset::new(client.clone(), sources.languages.clone()),
                Arc::clone(&store),
                Arc::clone(&observer),
                LanguagesDataset::settings(),
            )),
            store,
        }
    }

    /// The store every dataset persists into, for reads of derived documents.
    pub fn store(&self) -> &dyn DurableStore {
        self.store.as_ref()
    }

    /// Prime every dataset concurrently and arm their timers.
    ///
    /// Returns once every priming cycle has finished.
    pub async fn start_all(&self) {
        tokio::join!(
            self.version.start(),
            self.prices.start(),
            self.fiat.start(),
            self.explorers.start(),
            self.apps.start(),
            self.proxies.start(),
            self.networks.start(),
            self.languages.start(),
        );

        let statuses = self.statuses();
        let populated = statuses.iter().filter(|s| s.populated).count();
        info!(
            populated,
            total = statuses.len(),
            "Dataset caches primed"
        );
    }

    pub fn stop_all(&self) {
        self.version.stop();
        self.prices.stop();
        self.fiat.stop();
        self.explorers.stop();
        self.apps.stop();
        self.proxies.stop();
        self.networks.stop();
        self.languages.stop();
    }

    pub fn statuses(&self) -> Vec<CacheStatus> {
        vec![
            self.version.status(),
            self.prices.status(),
            self.fiat.status(),
            self.explorers.status(),
            self.apps.status(),
            self.proxies.status(),
            self.networks.status(),
            self.languages.status(),
        ]
    }
}
