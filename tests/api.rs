//! Endpoint tests against the full router with mock upstream fetchers.
//!
//! No network access: every upstream is a `MockSource`, so these run in
//! a plain `cargo test`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::util::ServiceExt;

use uganda_dashboard::api::{create_router, AppState};
use uganda_dashboard::config::Config;
use uganda_dashboard::indicator::{CountryProfile, SourceId};
use uganda_dashboard::sources::{MockProfileFetcher, MockSource, SourceRegistry};

fn test_app() -> (Router, AppState) {
    let who = MockSource::new(SourceId::Who)
        .with_series(
            "WHOSIS_000001",
            vec![(Some(2015), Some(60.1)), (Some(2022), Some(63.6))],
        )
        .with_series("WHOSIS_000015", vec![(Some(2022), Some(31.0)), (None, Some(9.9))])
        .with_failure("MDG_0000000001")
        .with_failure_after_delay("WHS9_86", Duration::from_millis(50));

    let world_bank = MockSource::new(SourceId::WorldBank)
        .with_series(
            "SP.POP.TOTL",
            vec![(Some(2021), Some(45_853_778.0)), (Some(2022), Some(47_249_585.0))],
        )
        .with_series("NY.GDP.MKTP.CD", vec![(Some(2022), Some(45.56e9))]);

    let unesco = MockSource::new(SourceId::Unesco)
        .with_series("CR.1", vec![(Some(2016), Some(52.3)), (Some(2021), Some(57.8))]);

    let rest_countries = MockSource::new(SourceId::RestCountries)
        .with_series("population", vec![(None, Some(45_741_007.0))]);

    let profile = MockProfileFetcher::with_profile(CountryProfile {
        name: "Uganda".to_string(),
        capital: Some("Kampala".to_string()),
        region: Some("Africa".to_string()),
        subregion: Some("Eastern Africa".to_string()),
        population: Some(45_741_007.0),
        area_km2: Some(241_550.0),
        languages: vec!["English".to_string(), "Swahili".to_string()],
        currencies: vec!["Ugandan shilling".to_string()],
        flag: None,
    });

    let registry = SourceRegistry::new(
        Arc::new(who),
        Arc::new(world_bank),
        Arc::new(unesco),
        Arc::new(rest_countries),
        Arc::new(profile),
    );

    let state = AppState::with_sources(Config::default(), registry);
    (create_router(state.clone()), state)
}

async fn get(app: Router, path: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn health_reports_healthy() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Uganda Dashboard API");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn domain_batch_isolates_per_code_failures() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let data = body["data"].as_object().expect("batch object");
    // Every registered health code has an entry, failures included.
    assert_eq!(data.len(), 7);
    assert_eq!(data["WHOSIS_000001"]["data"].as_array().unwrap().len(), 2);
    assert!(data["MDG_0000000001"]["data"].as_array().unwrap().is_empty());
    assert!(data["WHS9_86"]["data"].as_array().unwrap().is_empty());
    assert_eq!(data["WHOSIS_000001"]["name"], "Life expectancy at birth");
}

#[tokio::test]
async fn unknown_domain_is_404() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/sports").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn economy_alias_resolves() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/economy").await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_object().expect("batch object");
    assert!(data.contains_key("NY.GDP.MKTP.CD"));
}

#[tokio::test]
async fn summary_builds_headline_cards() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/summary").await;

    assert_eq!(status, StatusCode::OK);
    let cards = body["data"].as_array().expect("card list");
    assert_eq!(cards.len(), 4);

    let population = cards
        .iter()
        .find(|c| c["code"] == "SP.POP.TOTL")
        .expect("population card");
    assert_eq!(population["latest_year"], 2022);
    assert_eq!(population["display_value"], "47.2M");

    let gdp = cards
        .iter()
        .find(|c| c["code"] == "NY.GDP.MKTP.CD")
        .expect("gdp card");
    // Single observation: no growth rate.
    assert!(gdp["growth_rate_pct"].is_null());
}

#[tokio::test]
async fn trends_drop_unplottable_points() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/trends/health").await;

    assert_eq!(status, StatusCode::OK);
    let series = body["data"].as_array().expect("trend list");

    // Only codes with at least one plottable point appear.
    let codes: Vec<&str> = series
        .iter()
        .filter_map(|s| s["indicator"].as_str())
        .collect();
    assert_eq!(codes, vec!["WHOSIS_000001", "WHOSIS_000015"]);

    // The year-less observation was dropped.
    let infant = &series[1];
    assert_eq!(infant["data_points"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn indicator_lookup_by_code() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/indicators/SP.POP.TOTL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Population, total");
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_indicator_code_is_404() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/indicators/NOT.A.CODE").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn indicator_catalog_lists_health_codes() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/indicators").await;

    assert_eq!(status, StatusCode::OK);
    let catalog = body["data"].as_array().expect("catalog");
    assert_eq!(catalog.len(), 7);
    let life = catalog
        .iter()
        .find(|i| i["code"] == "WHOSIS_000001")
        .expect("life expectancy row");
    assert_eq!(life["data_points"], 2);
}

#[tokio::test]
async fn profile_returns_fact_sheet() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/uganda/profile").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Uganda");
    assert_eq!(body["data"]["capital"], "Kampala");
}

#[tokio::test]
async fn proxy_rejects_disallowed_host_without_calling_out() {
    let (app, state) = test_app();
    let (status, body) = get(app, "/api/proxy?url=https://evil.example/steal").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], "error");
    // Rejected before any outbound request was made.
    assert_eq!(state.proxy_call_count(), 0);
}

#[tokio::test]
async fn proxy_rejects_unparseable_url() {
    let (app, state) = test_app();
    let (status, body) = get(app, "/api/proxy?url=not-a-url").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(state.proxy_call_count(), 0);
}

#[tokio::test]
async fn unknown_api_path_is_json_404() {
    let (app, _) = test_app();
    let (status, body) = get(app, "/api/does/not/exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "API endpoint not found");
}
