// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the document store file | `/data` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `VERSION_SOURCE_URL` | Latest-release endpoint | GitHub releases API |
//! | `PRICES_SOURCE_URL` | Token price oracle | CryptoCompare `pricemulti` |
//! | `FIAT_SOURCE_URL` | Fiat rate source | open.er-api.com (USD base) |
//! | `EXPLORERS_SOURCE_URL` | Explorer directory | `<data repo>/explorers.json` |
//! | `APPS_SOURCE_URL` | App directory | `<data repo>/apps.json` |
//! | `PROXIES_SOURCE_URL` | Proxy directory | `<data repo>/proxies.json` |
//! | `NETWORKS_SOURCE_URL` | Network directory | `<data repo>/networks.json` |
//! | `LANGUAGES_SOURCE_URL` | Language packs | `<data repo>/languages.json` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use url::Url;

use crate::datasets::{directory, fiat, languages, prices, version, DirectoryKind};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// The redb document store lives in this directory as [`STORE_FILE_NAME`].
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "/data";
pub const STORE_FILE_NAME: &str = "gateway.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid IP address: {value}")]
    InvalidHost { var: &'static str, value: String },

    #[error("{var} is not a valid port: {value}")]
    InvalidPort { var: &'static str, value: String },

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must be `json` or `pretty`, got {value}")]
    InvalidLogFormat { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Where each dataset is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    pub version: Url,
    pub prices: Url,
    pub fiat: Url,
    pub explorers: Url,
    pub apps: Url,
    pub proxies: Url,
    pub networks: Url,
    pub languages: Url,
}

impl SourceUrls {
    fn load(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let directory_url = |var: &'static str, kind: DirectoryKind| match lookup(var) {
            Some(value) => parse_url(var, &value),
            None => Url::parse(directory::DEFAULT_SOURCE_BASE_URL)
                .and_then(|base| base.join(kind.file_name()))
                .map_err(|source| ConfigError::InvalidUrl { var, source }),
        };

        Ok(Self {
            version: url_or_default(lookup, "VERSION_SOURCE_URL", version::DEFAULT_SOURCE_URL)?,
            prices: url_or_default(lookup, "PRICES_SOURCE_URL", prices::DEFAULT_SOURCE_URL)?,
            fiat: url_or_default(lookup, "FIAT_SOURCE_URL", fiat::DEFAULT_SOURCE_URL)?,
            explorers: directory_url("EXPLORERS_SOURCE_URL", DirectoryKind::Explorers)?,
            apps: directory_url("APPS_SOURCE_URL", DirectoryKind::Apps)?,
            proxies: directory_url("PROXIES_SOURCE_URL", DirectoryKind::Proxies)?,
            networks: directory_url("NETWORKS_SOURCE_URL", DirectoryKind::Networks)?,
            languages: url_or_default(
                lookup,
                "LANGUAGES_SOURCE_URL",
                languages::DEFAULT_SOURCE_URL,
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    pub sources: SourceUrls,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = match lookup(HOST_ENV) {
            Some(value) => value.parse::<IpAddr>().map_err(|_| ConfigError::InvalidHost {
                var: HOST_ENV,
                value,
            })?,
            None => DEFAULT_HOST.parse().map_err(|_| ConfigError::InvalidHost {
                var: HOST_ENV,
                value: DEFAULT_HOST.to_string(),
            })?,
        };

        let port = match lookup(PORT_ENV) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                var: PORT_ENV,
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::default(),
            Some(value) if value == "json" => LogFormat::Json,
            Some(value) if value == "pretty" => LogFormat::Pretty,
            Some(value) => {
                return Err(ConfigError::InvalidLogFormat {
                    var: LOG_FORMAT_ENV,
                    value,
                })
            }
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            data_dir: PathBuf::from(
                lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            log_format,
            sources: SourceUrls::load(&lookup)?,
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { var, source })
}

fn url_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<Url, ConfigError> {
    parse_url(var, &lookup(var).unwrap_or_else(|| default.to_string()))
}
