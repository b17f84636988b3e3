//! Source fetchers, one per upstream statistical API.
//!
//! This module defines:
//! - The [`IndicatorSource`] trait with the shared fan-out/join `fetch_many`
//! - The [`ProfileFetcher`] trait for country facts
//! - The [`SourceRegistry`] injected into the endpoint layer
//! - Mock implementations for testing

pub mod mock;
pub mod restcountries;
pub mod unesco;
pub mod who;
pub mod worldbank;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::error::SourceError;
use crate::indicator::{CountryProfile, IndicatorRecord, SourceId, YearRange};
use crate::metrics;

pub use mock::{MockProfileFetcher, MockSource};
pub use restcountries::RestCountriesSource;
pub use unesco::UnescoSource;
pub use who::WhoSource;
pub use worldbank::WorldBankSource;

/// A fetcher for one upstream statistical API.
///
/// Implementations supply the per-code fetch; the trait supplies the
/// concurrent `fetch_many` with its failure-isolation contract.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Which upstream this fetcher talks to.
    fn id(&self) -> SourceId;

    /// Per-request network timeout.
    fn timeout(&self) -> Duration;

    /// Fetch all observations for one indicator code.
    ///
    /// One outbound GET, filtered per the upstream's convention. Errors here
    /// are recovered by `fetch_many`; a direct caller sees them raw.
    async fn fetch_indicator(
        &self,
        client: &reqwest::Client,
        code: &str,
        range: YearRange,
    ) -> Result<Vec<IndicatorRecord>, SourceError>;

    /// Build the transient client used for one batch of fetches.
    ///
    /// Acquired per batch and dropped when the batch completes; there is no
    /// pooled client shared across requests.
    fn make_client(&self) -> Result<reqwest::Client, SourceError> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .build()
            .map_err(|e| SourceError::ClientBuild(e.to_string()))
    }

    /// Fetch several indicator codes concurrently.
    ///
    /// Fan-out/barrier-join: all codes are fetched at once and the mapping
    /// is returned only when every fetch has resolved. A failed code yields
    /// an empty list under its key; the only hard error is failing to build
    /// the batch client. The result always has exactly one key per
    /// requested code.
    async fn fetch_many(
        &self,
        codes: &[&str],
        range: YearRange,
    ) -> Result<HashMap<String, Vec<IndicatorRecord>>, SourceError> {
        let client = self.make_client()?;

        let fetches = codes.iter().map(|code| {
            let client = &client;
            async move { (*code, self.fetch_indicator(client, code, range).await) }
        });

        let mut results = HashMap::with_capacity(codes.len());
        for (code, outcome) in join_all(fetches).await {
            let records = match outcome {
                Ok(records) => {
                    metrics::inc_fetch_ok(self.id());
                    records
                }
                Err(e) => {
                    warn!(
                        source = %self.id(),
                        code,
                        error = %e,
                        "indicator fetch failed, returning empty series"
                    );
                    metrics::inc_fetch_failed(self.id());
                    Vec::new()
                }
            };
            results.insert(code.to_string(), records);
        }

        Ok(results)
    }
}

/// Fetches country facts for the profile endpoint.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetch the configured country's profile.
    async fn fetch_profile(&self) -> Result<CountryProfile, SourceError>;
}

/// The set of live sources, injected into the endpoint layer.
///
/// Replaces the original's module-level singleton: handlers receive this
/// explicitly through application state, and tests swap in mocks.
pub struct SourceRegistry {
    who: Arc<dyn IndicatorSource>,
    world_bank: Arc<dyn IndicatorSource>,
    unesco: Arc<dyn IndicatorSource>,
    rest_countries: Arc<dyn IndicatorSource>,
    profile: Arc<dyn ProfileFetcher>,
}

impl SourceRegistry {
    /// Build the live registry from configuration.
    pub fn from_config(config: &Config) -> Self {
        let rest_countries = Arc::new(RestCountriesSource::new(config));
        Self {
            who: Arc::new(WhoSource::new(config)),
            world_bank: Arc::new(WorldBankSource::new(config)),
            unesco: Arc::new(UnescoSource::new(config)),
            profile: rest_countries.clone(),
            rest_countries,
        }
    }

    /// Build a registry from explicit sources (used by tests).
    pub fn new(
        who: Arc<dyn IndicatorSource>,
        world_bank: Arc<dyn IndicatorSource>,
        unesco: Arc<dyn IndicatorSource>,
        rest_countries: Arc<dyn IndicatorSource>,
        profile: Arc<dyn ProfileFetcher>,
    ) -> Self {
        Self {
            who,
            world_bank,
            unesco,
            rest_countries,
            profile,
        }
    }

    /// Look up the fetcher for an upstream.
    pub fn get(&self, id: SourceId) -> &Arc<dyn IndicatorSource> {
        match id {
            SourceId::Who => &self.who,
            SourceId::WorldBank => &self.world_bank,
            SourceId::Unesco => &self.unesco,
            SourceId::RestCountries => &self.rest_countries,
        }
    }

    /// The country-profile fetcher.
    pub fn profile(&self) -> &Arc<dyn ProfileFetcher> {
        &self.profile
    }
}

/// Issue one GET and parse the body as JSON, mapping non-2xx to an error.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    source: SourceId,
    code: &str,
) -> Result<Value, SourceError> {
    let response = client.get(url).query(query).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::UpstreamStatus {
            source_id: source,
            status: status.as_u16(),
            code: code.to_string(),
        });
    }

    response.json().await.map_err(|e| SourceError::MalformedPayload {
        source_id: source,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::MockSource;

    #[tokio::test]
    async fn fetch_many_returns_one_key_per_code() {
        let source = MockSource::new(SourceId::Who)
            .with_series("A", vec![(Some(2020), Some(1.0))])
            .with_failure("B");

        let range = YearRange::new(2018, 2023);
        let batch = source.fetch_many(&["A", "B", "C"], range).await.unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch["A"].len(), 1);
        assert!(batch["B"].is_empty(), "failed code must yield empty list");
        assert!(batch["C"].is_empty(), "unknown code must yield empty list");
    }

    #[tokio::test]
    async fn slow_code_does_not_abort_siblings() {
        let source = MockSource::new(SourceId::WorldBank)
            .with_series("FAST", vec![(Some(2021), Some(2.0))])
            .with_failure_after_delay("SLOW", Duration::from_millis(50));

        let range = YearRange::new(2018, 2023);
        let batch = source.fetch_many(&["FAST", "SLOW"], range).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch["FAST"].len(), 1);
        assert!(batch["SLOW"].is_empty());
    }
}
