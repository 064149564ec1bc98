// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    datasets::version::VersionInfo,
    error::ApiError,
    state::AppState,
    watch::{CachePhase, CacheStatus},
};

pub mod directories;
pub mod health;
pub mod languages;
pub mod prices;
pub mod version;

use directories::AppsFilterRequest;
use health::{HealthChecks, HealthResponse, ReadyResponse};

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/currencies", get(prices::list_currencies))
        .route("/currencies/prices", get(prices::currency_prices))
        .route("/prices", get(prices::get_prices))
        .route("/prices/timeline", get(prices::price_timeline))
        .route("/prices/{blockchain}/{chain_id}", get(prices::chain_prices))
        .route("/explorers", get(directories::list_explorers))
        .route("/proxies", get(directories::list_proxies))
        .route("/networks", get(directories::list_networks))
        .route(
            "/apps",
            get(directories::list_apps).post(directories::filter_apps),
        )
        .route("/languages", get(languages::list_languages))
        .route("/version", get(version::get_version))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .fallback(forbidden)
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Anything not routed above is refused.
async fn forbidden() -> ApiError {
    ApiError::forbidden()
}

/// Query flags are on when present with a non-empty value, so `?flat=0`
/// and `?flat=false` are on too.
pub(crate) fn is_set(flag: Option<&str>) -> bool {
    flag.is_some_and(|value| !value.is_empty())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        prices::list_currencies,
        prices::currency_prices,
        prices::get_prices,
        prices::price_timeline,
        prices::chain_prices,
        directories::list_explorers,
        directories::list_proxies,
        directories::list_networks,
        directories::list_apps,
        directories::filter_apps,
        languages::list_languages,
        version::get_version,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AppsFilterRequest,
            VersionInfo,
            CacheStatus,
            CachePhase,
            ReadyResponse,
            HealthChecks,
            HealthResponse
        )
    ),
    tags(
        (name = "Prices", description = "Token prices and fiat rates"),
        (name = "Directories", description = "Explorers, apps, proxies and networks"),
        (name = "Languages", description = "Wallet language packs"),
        (name = "Version", description = "Desktop wallet releases"),
        (name = "Health", description = "Liveness and dataset readiness")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::SourceUrls;
    use crate::datasets::testing::{spawn_fixture_sources, unreachable_sources};
    use crate::datasets::Datasets;
    use crate::http::SourceClient;
    use crate::store::MemoryStore;
    use crate::watch::TracingObserver;

    fn datasets_for(sources: &SourceUrls) -> Datasets {
        Datasets::new(
            sources,
            SourceClient::new().unwrap(),
            Arc::new(MemoryStore::new()),
            Arc::new(TracingObserver),
        )
    }

    async fn primed_app() -> (Router, Datasets) {
        let datasets = datasets_for(&spawn_fixture_sources().await);
        datasets.start_all().await;
        (router(AppState::new(datasets.clone())), datasets)
    }

    fn empty_app() -> Router {
        router(AppState::new(datasets_for(&unreachable_sources())))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[test]
    fn flags_follow_query_truthiness() {
        assert!(!is_set(None));
        assert!(!is_set(Some("")));
        assert!(is_set(Some("0")));
        assert!(is_set(Some("false")));
        assert!(is_set(Some("1")));
        assert!(is_set(Some("true")));
        assert!(is_set(Some("yes")));
    }

    #[tokio::test]
    async fn currencies_lists_supported_symbols() {
        let (app, datasets) = primed_app().await;

        let (status, body) = get_json(&app, "/currencies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!(["USD", "EUR", "CNY", "GBP", "JPY", "CAD", "CHF", "AUD"])
        );
        datasets.stop_all();
    }

    #[tokio::test]
    async fn currency_prices_keeps_only_supported_rates() {
        let (app, datasets) = primed_app().await;

        let (status, body) = get_json(&app, "/currencies/prices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "EUR": 0.92, "GBP": 0.79, "USD": 1.0 }));
        datasets.stop_all();
    }

    #[tokio::test]
    async fn prices_default_to_usd_and_expand_with_v2() {
        let (app, datasets) = primed_app().await;

        let (status, body) = get_json(&app, "/prices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "EOS": 0.62, "ETH": 2450.1 }));

        let (_, body) = get_json(&app, "/prices?v2=1").await;
        assert_eq!(body["EOS"], json!({ "EUR": 0.57, "USD": 0.62 }));
        assert_eq!(body["ETH"]["EUR"], json!(2260.4));
        datasets.stop_all();
    }

    #[tokio::test]
    async fn directories_group_by_blockchain_unless_flat() {
        let (app, datasets) = primed_app().await;

        let (status, body) = get_json(&app, "/explorers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["eos"][0]["name"], "explorer one");
        assert_eq!(body["trx"][0]["name"], "explorer two");

        let (_, body) = get_json(&app, "/explorers?flat=").await;
        assert!(body.is_object());

        let (_, body) = get_json(&app, "/explorers?flat=false").await;
        assert!(body.is_array());

        let (_, body) = get_json(&app, "/proxies?flat=true").await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["blockchain"], "eos");
        assert_eq!(entries[1]["blockchain"], "trx");

        let (status, body) = get_json(&app, "/networks").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["eos"][0]["name"], "network one");
        datasets.stop_all();
    }

    #[tokio::test]
    async fn apps_can_be_listed_flat_or_filtered() {
        let (app, datasets) = primed_app().await;

        let (_, body) = get_json(&app, "/apps?flat=1").await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (status, body) = post_json(
            &app,
            "/apps",
            json!({ "apps": ["dex.example", "swap.example", "missing.example"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let selected = body.as_array().unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0]["applink"], "dex.example");
        assert_eq!(selected[0]["blockchain"], "eos");
        assert_eq!(selected[1]["applink"], "swap.example");

        let (_, body) = post_json(&app, "/apps", json!({ "apps": [] })).await;
        assert_eq!(body["eos"].as_array().unwrap().len(), 2);
        datasets.stop_all();
    }

    #[tokio::test]
    async fn bare_apps_post_returns_whole_directory() {
        let (app, datasets) = primed_app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/apps")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["eos"].as_array().unwrap().len(), 2);
        assert_eq!(body["eth"].as_array().unwrap().len(), 1);

        let (status, body) = post_json(&app, "/apps", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_object());
        datasets.stop_all();
    }

    #[tokio::test]
    async fn price_timeline_serves_todays_snapshots() {
        let (app, datasets) = primed_app().await;

        let (status, body) = get_json(&app, "/prices/timeline").await;
        assert_eq!(status, StatusCode::OK);
        let hours = body.as_object().unwrap();
        assert_eq!(hours.len(), 1);
        let snapshot = hours.values().next().unwrap();
        assert_eq!(snapshot["EOS"]["USD"], json!(0.62));

        let (status, body) = get_json(&app, "/prices/timeline?date=20000101").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, body) = get_json(&app, "/prices/timeline?date=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("YYYYMMDD"));
        datasets.stop_all();
    }

    #[tokio::test]
    async fn chain_prices_are_not_served() {
        let app = empty_app();

        let (status, body) = get_json(&app, "/prices/eos/aca376f2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(false));
    }

    #[tokio::test]
    async fn languages_support_names_and_single_lookup() {
        let (app, datasets) = primed_app().await;

        let (_, body) = get_json(&app, "/languages").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = get_json(&app, "/languages?names=true").await;
        assert_eq!(body, json!(["English", "Deutsch"]));

        let (_, body) = get_json(&app, "/languages?name=Deutsch").await;
        assert_eq!(body["locales"]["generic"], "Allgemein");

        let (status, body) = get_json(&app, "/languages?name=Klingon").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
        datasets.stop_all();
    }

    #[tokio::test]
    async fn version_returns_latest_release() {
        let (app, datasets) = primed_app().await;

        let (status, body) = get_json(&app, "/version").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], "v11.0.1");
        assert_eq!(body["mac"], "https://example.com/assets/mac");
        assert_eq!(body["details"], "Stability fixes");
        datasets.stop_all();
    }

    #[tokio::test]
    async fn unpopulated_datasets_answer_service_unavailable() {
        let app = empty_app();

        for uri in ["/prices", "/apps", "/languages", "/version"] {
            let (status, body) = get_json(&app, uri).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
            assert!(body["error"].as_str().unwrap().contains("not available"));
        }

        let (status, _) = get_json(&app, "/currencies").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(&app, "/currencies/prices").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn health_reflects_dataset_population() {
        let app = empty_app();
        let (status, body) = get_json(&app, "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");

        let (status, _) = get_json(&app, "/health/live").await;
        assert_eq!(status, StatusCode::OK);

        let (app, datasets) = primed_app().await;
        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["datasets"].as_array().unwrap().len(), 8);
        assert_eq!(body["checks"]["datasets"][0]["phase"], "steady");
        datasets.stop_all();
    }

    #[tokio::test]
    async fn unknown_routes_are_forbidden() {
        let app = empty_app();

        let (status, body) = get_json(&app, "/admin").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = empty_app();

        let request = Request::builder()
            .uri("/health/live")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = empty_app();

        let (status, body) = get_json(&app, "/api-doc/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/prices"].is_object());
        assert!(body["paths"]["/prices/timeline"].is_object());
        assert!(body["paths"]["/apps"]["post"].is_object());
    }
}
