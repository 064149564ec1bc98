// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local stand-ins for external data sources, for tests.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

use crate::config::SourceUrls;

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub(crate) async fn spawn_source(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

pub(crate) fn release_fixture() -> Value {
    json!({
        "tag_name": "v11.0.1",
        "prerelease": false,
        "body": "Stability fixes",
        "assets": [
            { "name": "wallet-mac-11.0.1.dmg", "url": "https://example.com/assets/mac" },
            { "name": "wallet-win-11.0.1.exe", "url": "https://example.com/assets/win" },
            { "name": "wallet-linux-11.0.1.AppImage", "url": "https://example.com/assets/linux" }
        ]
    })
}

pub(crate) fn prices_fixture() -> Value {
    json!({
        "EOS": { "USD": 0.62, "EUR": 0.57 },
        "ETH": { "USD": 2450.1, "EUR": 2260.4 }
    })
}

pub(crate) fn fiat_fixture() -> Value {
    json!({
        "result": "success",
        "base_code": "USD",
        "rates": { "USD": 1.0, "EUR": 0.92, "GBP": 0.79, "SEK": 10.4 }
    })
}

pub(crate) fn apps_fixture() -> Value {
    json!({
        "eos": [
            { "applink": "bank.example", "name": "Bank" },
            { "applink": "dex.example", "name": "Dex" }
        ],
        "eth": [
            { "applink": "swap.example", "name": "Swap", "blockchain": "eth" }
        ]
    })
}

pub(crate) fn directory_fixture(name: &str) -> Value {
    json!({
        "eos": [ { "name": format!("{name} one") } ],
        "trx": [ { "name": format!("{name} two") } ]
    })
}

pub(crate) fn languages_fixture() -> Value {
    json!([
        { "name": "English", "locales": { "generic": "Generic" } },
        { "name": "Deutsch", "locales": { "generic": "Allgemein" } }
    ])
}

/// Start one local source serving a fixture for every dataset.
pub(crate) async fn spawn_fixture_sources() -> SourceUrls {
    let app = Router::new()
        .route("/version", get(|| async { Json(release_fixture()) }))
        .route("/prices", get(|| async { Json(prices_fixture()) }))
        .route("/fiat", get(|| async { Json(fiat_fixture()) }))
        .route("/apps", get(|| async { Json(apps_fixture()) }))
        .route("/explorers", get(|| async { Json(directory_fixture("explorer")) }))
        .route("/proxies", get(|| async { Json(directory_fixture("proxy")) }))
        .route("/networks", get(|| async { Json(directory_fixture("network")) }))
        .route("/languages", get(|| async { Json(languages_fixture()) }));
    let base = spawn_source(app).await;

    SourceUrls {
        version: base.join("version").unwrap(),
        prices: base.join("prices").unwrap(),
        fiat: base.join("fiat").unwrap(),
        explorers: base.join("explorers").unwrap(),
        apps: base.join("apps").unwrap(),
        proxies: base.join("proxies").unwrap(),
        networks: base.join("networks").unwrap(),
        languages: base.join("languages").unwrap(),
    }
}

/// Source URLs that refuse every connection.
pub(crate) fn unreachable_sources() -> SourceUrls {
    let dead = Url::parse("http://127.0.0.1:9/").unwrap();
    SourceUrls {
        version: dead.join("version").unwrap(),
        prices: dead.join("prices").unwrap(),
        fiat: dead.join("fiat").unwrap(),
        explorers: dead.join("explorers").unwrap(),
        apps: dead.join("apps").unwrap(),
        proxies: dead.join("proxies").unwrap(),
        networks: dead.join("networks").unwrap(),
        languages: dead.join("languages").unwrap(),
    }
}
