//! World Bank open data fetcher.
//!
//! The v2 API addresses the country in the path
//! (`/country/{iso3}/indicator/{code}`) and takes
//! `format=json&date=start:end&per_page=100`. The body is a two-element
//! array: `[metadata, rows]`, where `rows` is null when no data exists for
//! the period.

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

/// Fetcher for the World Bank v2 API.
#[derive(Debug, Clone)]
pub struct WorldBankSource {
    base_url: String,
    country: String,
    timeout: Duration,
}

impl WorldBankSource {
    /// Create a fetcher from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.world_bank_base_url.trim_end_matches('/').to_string(),
            country: config.country_code.clone(),
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    /// Unwrap the `[metadata, rows]` envelope and normalize the rows.
    ///
    /// A null/absent second element means "no data for this period" and
    /// yields an empty list, not an error.
    fn parse_response(code: &str, body: &Value) -> Result<Vec<IndicatorRecord>, SourceError> {
        let envelope = body.as_array().ok_or_else(|| SourceError::MalformedPayload {
            source_id: SourceId::WorldBank,
            reason: "response is not an array".to_string(),
        })?;

        let Some(rows) = envelope.get(1).and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        let mut dropped = 0u64;
        let mut records: Vec<IndicatorRecord> = rows
            .iter()
            .filter_map(|item| {
                let record = normalize(code, item, SourceId::WorldBank);
                if record.is_none() {
                    dropped += 1;
                }
                record
            })
            .collect();

        metrics::inc_items_dropped(SourceId::WorldBank, dropped);
        // The API returns newest-first.
        records.sort_by_key(|r| r.year.unwrap_or(0));
        Ok(records)
    }
}

#[async_trait]
impl IndicatorSource for WorldBankSource {
    fn id(&self) -> SourceId {
        SourceId::WorldBank
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, client), fields(source = "world_bank"))]
    async fn fetch_indicator(
        &self,
        client: &reqwest::Client,
        code: &str,
        range: YearRange,
    ) -> Result<Vec<IndicatorRecord>, SourceError> {
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url, self.country, code
        );
        let query = [
            ("format", "json".to_string()),
            ("date", format!("{}:{}", range.start, range.end)),
            ("per_page", "100".to_string()),
        ];

        let body = get_json(client, &url, &query, SourceId::WorldBank, code).await?;
        Self::parse_response(code, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_envelope_and_sorts_ascending() {
        let body = json!([
            { "page": 1, "pages": 1, "per_page": 100, "total": 2 },
            [
                {
                    "indicator": { "id": "SP.POP.TOTL", "value": "Population, total" },
                    "countryiso3code": "UGA",
                    "date": "2022",
                    "value": 47249585.0
                },
                {
                    "indicator": { "id": "SP.POP.TOTL", "value": "Population, total" },
                    "countryiso3code": "UGA",
                    "date": "2021",
                    "value": 45853778.0
                }
            ]
        ]);

        let records = WorldBankSource::parse_response("SP.POP.TOTL", &body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(2021));
        assert_eq!(records[1].year, Some(2022));
        assert_eq!(records[1].indicator_name, "Population, total");
    }

    #[test]
    fn null_rows_mean_no_data() {
        let body = json!([{ "page": 1, "pages": 0, "total": 0 }, null]);
        let records = WorldBankSource::parse_response("NY.GDP.MKTP.CD", &body).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn metadata_only_envelope_means_no_data() {
        let body = json!([{ "message": [{ "id": "120", "value": "Invalid indicator" }] }]);
        let records = WorldBankSource::parse_response("BAD.CODE", &body).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn non_array_body_is_malformed() {
        let body = json!({ "error": "teapot" });
        let err = WorldBankSource::parse_response("SP.POP.TOTL", &body).unwrap_err();
        assert!(matches!(err, SourceError::MalformedPayload { .. }));
    }

    #[test]
    fn null_values_survive_as_none() {
        let body = json!([
            { "total": 1 },
            [{ "indicator": { "id": "X" }, "date": "2023", "value": null }]
        ]);

        let records = WorldBankSource::parse_response("X", &body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, None);
    }
}
