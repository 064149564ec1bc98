// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound HTTP client shared by all external data sources.
//!
//! Every request is a plain `GET` returning JSON. A random `rand` query
//! parameter is appended so intermediate caches and CDNs never serve a stale
//! body.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

/// Hard ceiling on a single request. Watched caches apply their own,
/// tighter, per-dataset timeout on top of this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!("wallet-gateway/", env!("CARGO_PKG_VERSION"));

/// Name of the cache-busting query parameter.
const CACHE_BUST_PARAM: &str = "rand";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {0} from source")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Thin wrapper around [`reqwest::Client`] for dataset fetchers.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: Client,
}

impl SourceClient {
    pub fn new() -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Fetch `url` and decode its JSON body into `T`.
    ///
    /// Non-2xx statuses and bodies that do not match `T` are failures; a body
    /// is never partially accepted.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let response = self
            .http
            .get(cache_busted(url))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn cache_busted(url: &Url) -> Url {
    let mut url = url.clone();
    url.query_pairs_mut()
        .append_pair(CACHE_BUST_PARAM, &uuid::Uuid::new_v4().simple().to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_buster_is_appended() {
        let url = Url::parse("https://api.example.com/releases/latest").unwrap();
        let busted = cache_busted(&url);

        let pairs: Vec<_> = busted.query_pairs().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, CACHE_BUST_PARAM);
        assert_eq!(pairs[0].1.len(), 32);
    }

    #[test]
    fn cache_buster_keeps_existing_query() {
        let url = Url::parse("https://api.example.com/price?fsyms=EOS&tsyms=USD").unwrap();
        let busted = cache_busted(&url);

        let keys: Vec<String> = busted.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, vec!["fsyms", "tsyms", CACHE_BUST_PARAM]);
    }

    #[test]
    fn cache_buster_differs_between_requests() {
        let url = Url::parse("https://api.example.com/apps.json").unwrap();
        assert_ne!(cache_busted(&url), cache_busted(&url));
    }
}
