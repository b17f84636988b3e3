//! Mock sources for unit and endpoint testing.
//!
//! These implement the same traits as the live fetchers without touching
//! the network, with per-code failure and latency injection.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::indicator::{CountryProfile, IndicatorRecord, SourceId, YearRange};

use super::{IndicatorSource, ProfileFetcher};

/// Mock indicator source with canned per-code data.
#[derive(Debug, Clone)]
pub struct MockSource {
    id: SourceId,
    series: HashMap<String, Vec<IndicatorRecord>>,
    failures: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl MockSource {
    /// Create an empty mock for the given upstream.
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            series: HashMap::new(),
            failures: HashSet::new(),
            delays: HashMap::new(),
        }
    }

    /// Add canned `(year, value)` observations for a code.
    pub fn with_series(mut self, code: &str, points: Vec<(Option<i32>, Option<f64>)>) -> Self {
        let records = points
            .into_iter()
            .map(|(year, value)| IndicatorRecord {
                indicator_code: code.to_string(),
                indicator_name: String::new(),
                year,
                value,
                display_value: None,
                dim1: None,
                dim2: None,
                dim3: None,
            })
            .collect();
        self.series.insert(code.to_string(), records);
        self
    }

    /// Make fetches for a code fail immediately.
    pub fn with_failure(mut self, code: &str) -> Self {
        self.failures.insert(code.to_string());
        self
    }

    /// Make fetches for a code fail after a delay (simulated timeout).
    pub fn with_failure_after_delay(mut self, code: &str, delay: Duration) -> Self {
        self.failures.insert(code.to_string());
        self.delays.insert(code.to_string(), delay);
        self
    }

    /// Delay fetches for a code without failing them.
    pub fn with_delay(mut self, code: &str, delay: Duration) -> Self {
        self.delays.insert(code.to_string(), delay);
        self
    }
}

#[async_trait]
impl IndicatorSource for MockSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn fetch_indicator(
        &self,
        _client: &reqwest::Client,
        code: &str,
        _range: YearRange,
    ) -> Result<Vec<IndicatorRecord>, SourceError> {
        if let Some(delay) = self.delays.get(code) {
            tokio::time::sleep(*delay).await;
        }

        if self.failures.contains(code) {
            return Err(SourceError::UpstreamStatus {
                source_id: self.id,
                status: 503,
                code: code.to_string(),
            });
        }

        Ok(self.series.get(code).cloned().unwrap_or_default())
    }
}

/// Mock country-profile fetcher.
#[derive(Debug, Clone, Default)]
pub struct MockProfileFetcher {
    /// Profile to return.
    pub profile: CountryProfile,
    /// Whether to fail instead.
    pub fail: bool,
}

impl MockProfileFetcher {
    /// Mock answering with the given profile.
    pub fn with_profile(profile: CountryProfile) -> Self {
        Self {
            profile,
            fail: false,
        }
    }

    /// Mock that always fails.
    pub fn failing() -> Self {
        Self {
            profile: CountryProfile::default(),
            fail: true,
        }
    }
}

#[async_trait]
impl ProfileFetcher for MockProfileFetcher {
    async fn fetch_profile(&self) -> Result<CountryProfile, SourceError> {
        if self.fail {
            return Err(SourceError::UpstreamStatus {
                source_id: SourceId::RestCountries,
                status: 503,
                code: "profile".to_string(),
            });
        }
        Ok(self.profile.clone())
    }
}
