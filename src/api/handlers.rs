//! HTTP API handlers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::domains::{self, Domain};
use crate::error::{ApiError, Result, SourceError};
use crate::indicator::{
    now_rfc3339, Envelope, IndicatorBatch, IndicatorRecord, IndicatorSeries, SourceId, SummaryCard,
    TrendPoint, TrendSeries, YearRange,
};
use crate::metrics;
use crate::sources::SourceRegistry;
use crate::stats;

/// Hosts the outbound proxy may forward to.
pub const ALLOWED_PROXY_HOSTS: &[&str] = &[
    "api.github.com",
    "jsonplaceholder.typicode.com",
    "ghoapi.azureedge.net",
];

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Live or mock upstream fetchers.
    pub sources: Arc<SourceRegistry>,
    /// Count of proxy requests actually forwarded upstream.
    pub proxy_calls: Arc<AtomicU64>,
}

impl AppState {
    /// Build state with live fetchers.
    pub fn new(config: Config) -> Self {
        let sources = SourceRegistry::from_config(&config);
        Self::with_sources(config, sources)
    }

    /// Build state with explicit fetchers (used by tests).
    pub fn with_sources(config: Config, sources: SourceRegistry) -> Self {
        Self {
            config: Arc::new(config),
            sources: Arc::new(sources),
            proxy_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of proxy requests forwarded so far.
    pub fn proxy_call_count(&self) -> u64 {
        self.proxy_calls.load(Ordering::SeqCst)
    }

    fn year_range(&self) -> YearRange {
        YearRange::new(self.config.start_year, self.config.end_year)
    }
}

// ============================================================================
// LIVENESS
// ============================================================================

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the process answers.
    pub status: String,
    /// Service identifier.
    pub service: String,
    /// Response time, RFC 3339.
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "Uganda Dashboard API".to_string(),
        timestamp: now_rfc3339(),
    })
}

// ============================================================================
// DOMAIN BATCHES
// ============================================================================

/// GET /api/uganda/:domain
///
/// Fetches every indicator of one topic area from its owning upstream.
pub async fn domain_batch(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<Envelope<IndicatorBatch>>> {
    let domain = parse_domain(&segment)?;

    info!(domain = domain.as_str(), "fetching domain batch");
    let batch = fetch_domain(&state, domain).await?;

    Ok(Json(Envelope::success(batch)))
}

/// GET /api/uganda/trends/:domain
///
/// Chart-ready series: null years/values dropped, points sorted by year.
pub async fn domain_trends(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<Envelope<Vec<TrendSeries>>>> {
    let domain = parse_domain(&segment)?;
    let batch = fetch_domain(&state, domain).await?;

    let mut trends: Vec<TrendSeries> = batch
        .into_iter()
        .filter_map(|(code, series)| {
            let mut points: Vec<TrendPoint> = series
                .data
                .iter()
                .filter_map(|r| {
                    Some(TrendPoint {
                        year: r.year?,
                        value: r.value?,
                    })
                })
                .collect();
            points.sort_by_key(|p| p.year);

            (!points.is_empty()).then_some(TrendSeries {
                indicator: code,
                indicator_name: series.name,
                data_points: points,
            })
        })
        .collect();
    trends.sort_by(|a, b| a.indicator.cmp(&b.indicator));

    Ok(Json(Envelope::success(trends)))
}

// ============================================================================
// SUMMARY
// ============================================================================

/// GET /api/uganda/summary
///
/// Headline cards assembled from several upstreams fetched concurrently.
/// A single upstream's hard failure degrades its cards; only the loss of
/// every upstream is a 500.
pub async fn summary(State(state): State<AppState>) -> Result<Json<Envelope<Vec<SummaryCard>>>> {
    let range = state.year_range();

    let who_codes = summary_codes(SourceId::Who);
    let wb_codes = summary_codes(SourceId::WorldBank);
    let unesco_codes = summary_codes(SourceId::Unesco);

    let (who_result, wb_result, unesco_result) = tokio::join!(
        state.sources.get(SourceId::Who).fetch_many(&who_codes, range),
        state
            .sources
            .get(SourceId::WorldBank)
            .fetch_many(&wb_codes, range),
        state
            .sources
            .get(SourceId::Unesco)
            .fetch_many(&unesco_codes, range),
    );

    let mut failures: Vec<SourceError> = Vec::new();
    let mut recover = |result: std::result::Result<
        HashMap<String, Vec<IndicatorRecord>>,
        SourceError,
    >| match result {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, "summary source failed entirely");
            failures.push(e);
            HashMap::new()
        }
    };

    let who_map = recover(who_result);
    let wb_map = recover(wb_result);
    let unesco_map = recover(unesco_result);

    if failures.len() == 3 {
        // Nothing answered at all.
        return Err(ApiError::Source(failures.remove(0)));
    }

    let mut cards = Vec::with_capacity(domains::SUMMARY_INDICATORS.len());
    for (source, code) in domains::SUMMARY_INDICATORS {
        let map = match source {
            SourceId::Who => &who_map,
            SourceId::WorldBank => &wb_map,
            SourceId::Unesco => &unesco_map,
            SourceId::RestCountries => continue,
        };
        let records = map.get(*code).map(Vec::as_slice).unwrap_or_default();
        cards.push(build_card(code, records));
    }

    Ok(Json(Envelope::success(cards)))
}

fn summary_codes(source: SourceId) -> Vec<&'static str> {
    domains::SUMMARY_INDICATORS
        .iter()
        .filter(|(s, _)| *s == source)
        .map(|(_, code)| *code)
        .collect()
}

fn build_card(code: &str, records: &[IndicatorRecord]) -> SummaryCard {
    let latest = stats::latest(records);
    let latest_value = latest.and_then(|r| r.value);

    SummaryCard {
        code: code.to_string(),
        name: domains::indicator_name(code).unwrap_or(code).to_string(),
        latest_year: latest.and_then(|r| r.year),
        latest_value,
        display_value: stats::format_large_number(latest_value),
        growth_rate_pct: stats::growth_rate(records, stats::DEFAULT_MIN_SPAN_YEARS),
    }
}

// ============================================================================
// INDICATOR LOOKUPS
// ============================================================================

/// One row of the indicator catalog.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndicatorInfo {
    /// Indicator code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Observations fetched for this code.
    pub data_points: usize,
}

/// GET /api/uganda/indicators
///
/// Catalog of health indicators with per-code observation counts.
pub async fn indicators_index(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<IndicatorInfo>>>> {
    let batch = fetch_domain(&state, Domain::Health).await?;

    let mut catalog: Vec<IndicatorInfo> = batch
        .into_iter()
        .map(|(code, series)| IndicatorInfo {
            code,
            name: series.name,
            data_points: series.data.len(),
        })
        .collect();
    catalog.sort_by(|a, b| a.code.cmp(&b.code));

    Ok(Json(Envelope::success(catalog)))
}

/// GET /api/uganda/indicators/:code
///
/// Single-indicator lookup; 404 for unregistered codes and for codes the
/// upstream has no data for.
pub async fn indicator_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Envelope<IndicatorSeries>>> {
    let source_id = domains::owning_source(&code)
        .ok_or_else(|| ApiError::NotFound(format!("indicator {code}")))?;

    let mut batch = state
        .sources
        .get(source_id)
        .fetch_many(&[code.as_str()], state.year_range())
        .await?;

    let data = batch.remove(&code).unwrap_or_default();
    if data.is_empty() {
        return Err(ApiError::NotFound(format!("indicator {code}")));
    }

    Ok(Json(Envelope::success(IndicatorSeries {
        name: domains::indicator_name(&code).unwrap_or(&code).to_string(),
        data,
    })))
}

// ============================================================================
// COUNTRY PROFILE
// ============================================================================

/// GET /api/uganda/profile
pub async fn country_profile(
    State(state): State<AppState>,
) -> Result<Json<Envelope<crate::indicator::CountryProfile>>> {
    let profile = state.sources.profile().fetch_profile().await?;
    Ok(Json(Envelope::success(profile)))
}

// ============================================================================
// PROXY
// ============================================================================

/// Query parameters for the proxy route.
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    /// Absolute target URL.
    pub url: String,
}

/// GET /api/proxy?url=...
///
/// Forwards a GET to an allow-listed host and relays the JSON body.
/// Disallowed hosts are rejected with 403 before any outbound call.
pub async fn proxy(
    State(state): State<AppState>,
    Query(params): Query<ProxyQuery>,
) -> Result<Json<Value>> {
    let target = Url::parse(&params.url).map_err(|e| ApiError::ProxyBadUrl(e.to_string()))?;

    let host = target
        .host_str()
        .ok_or_else(|| ApiError::ProxyBadUrl("url has no host".to_string()))?;

    if !ALLOWED_PROXY_HOSTS.contains(&host) {
        metrics::inc_proxy_rejected();
        return Err(ApiError::ProxyForbidden(host.to_string()));
    }

    state.proxy_calls.fetch_add(1, Ordering::SeqCst);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(state.config.http_timeout_secs))
        .build()
        .map_err(|e| ApiError::Source(SourceError::ClientBuild(e.to_string())))?;

    let response = client
        .get(target)
        .send()
        .await
        .map_err(|e| ApiError::Source(SourceError::Http(e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::ProxyUpstream(status.as_u16()));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ApiError::Source(SourceError::Http(e)))?;
    Ok(Json(body))
}

// ============================================================================
// HELPERS
// ============================================================================

fn parse_domain(segment: &str) -> Result<Domain> {
    Domain::parse(segment).ok_or_else(|| ApiError::NotFound(format!("dashboard domain {segment}")))
}

/// Fetch one domain's code table and assemble the batch.
///
/// Every registered code ends up in the batch, with an empty `data` list
/// when its fetch failed.
async fn fetch_domain(state: &AppState, domain: Domain) -> Result<IndicatorBatch> {
    let codes = domain.codes();
    let mut fetched = state
        .sources
        .get(domain.source())
        .fetch_many(&codes, state.year_range())
        .await?;

    let batch = domain
        .indicators()
        .iter()
        .map(|(code, name)| {
            let data = fetched.remove(*code).unwrap_or_default();
            (
                code.to_string(),
                IndicatorSeries {
                    name: name.to_string(),
                    data,
                },
            )
        })
        .collect();

    Ok(batch)
}
