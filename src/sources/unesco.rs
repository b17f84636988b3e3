//! UNESCO Institute for Statistics fetcher.
//!
//! The UIS API filters by indicator and reference area through query
//! parameters and returns SDMX-flavored rows keyed `TIME_PERIOD` /
//! `OBS_VALUE` / `REF_AREA`, either as a bare array or wrapped in
//! `{"records": [...]}` depending on the endpoint revision.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::config::Config;
use crate::error::SourceError;
use crate::indicator::{IndicatorRecord, SourceId, YearRange};
use crate::metrics;
use crate::normalize::normalize;

use super::{get_json, IndicatorSource};

/// Fetcher for the UNESCO UIS API.
#[derive(Debug, Clone)]
pub struct UnescoSource {
    base_url: String,
    country: String,
    timeout: Duration,
}

impl UnescoSource {
    /// Create a fetcher from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.unesco_base_url.trim_end_matches('/').to_string(),
            country: config.country_code.clone(),
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    /// Unwrap and normalize one UIS response body.
    ///
    /// The REF_AREA filter is re-checked client-side; the API has been
    /// observed returning unfiltered rows for some indicator families.
    fn parse_response(&self, code: &str, body: &Value) -> Result<Vec<IndicatorRecord>, SourceError> {
        let rows = body
            .as_array()
            .or_else(|| body.get("records").and_then(Value::as_array))
            .ok_or_else(|| SourceError::MalformedPayload {
                source_id: SourceId::Unesco,
                reason: "expected array or 'records' array".to_string(),
            })?;

        let mut dropped = 0u64;
        let mut records: Vec<IndicatorRecord> = rows
            .iter()
            .filter(|item| {
                item.get("REF_AREA")
                    .and_then(Value::as_str)
                    .map(|area| area == self.country)
                    .unwrap_or(true)
            })
            .filter_map(|item| {
                let record = normalize(code, item, SourceId::Unesco);
                if record.is_none() {
                    dropped += 1;
                }
                record
            })
            .collect();

        metrics::inc_items_dropped(SourceId::Unesco, dropped);
        records.sort_by_key(|r| r.year.unwrap_or(0));
        Ok(records)
    }
}

#[async_trait]
impl IndicatorSource for UnescoSource {
    fn id(&self) -> SourceId {
        SourceId::Unesco
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, client), fields(source = "unesco"))]
    async fn fetch_indicator(
        &self,
        client: &reqwest::Client,
        code: &str,
        range: YearRange,
    ) -> Result<Vec<IndicatorRecord>, SourceError> {
        let url = format!("{}/data/indicators", self.base_url);
        let query = [
            ("indicator", code.to_string()),
            ("geoUnit", self.country.clone()),
            ("start", range.start.to_string()),
            ("end", range.end.to_string()),
            ("format", "json".to_string()),
        ];

        let body = get_json(client, &url, &query, SourceId::Unesco, code).await?;
        self.parse_response(code, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn source() -> UnescoSource {
        UnescoSource::new(&Config::default())
    }

    #[test]
    fn parses_bare_array() {
        let body = json!([
            { "REF_AREA": "UGA", "TIME_PERIOD": "2019", "OBS_VALUE": 55.2 },
            { "REF_AREA": "UGA", "TIME_PERIOD": "2017", "OBS_VALUE": 51.9 }
        ]);

        let records = source().parse_response("CR.1", &body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(2017));
        assert_eq!(records[1].value, Some(55.2));
    }

    #[test]
    fn parses_records_wrapper() {
        let body = json!({
            "records": [
                { "REF_AREA": "UGA", "TIME_PERIOD": 2020, "OBS_VALUE": "58.0" }
            ]
        });

        let records = source().parse_response("CR.1", &body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, Some(2020));
        assert_eq!(records[0].value, Some(58.0));
    }

    #[test]
    fn re_checks_ref_area() {
        let body = json!([
            { "REF_AREA": "TZA", "TIME_PERIOD": "2019", "OBS_VALUE": 1.0 },
            { "REF_AREA": "UGA", "TIME_PERIOD": "2019", "OBS_VALUE": 2.0 }
        ]);

        let records = source().parse_response("ROFST.1", &body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, Some(2.0));
    }

    #[test]
    fn object_without_records_is_malformed() {
        let body = json!({ "dataSets": [] });
        let err = source().parse_response("CR.1", &body).unwrap_err();
        assert!(matches!(err, SourceError::MalformedPayload { .. }));
    }
}
