//! WHO Global Health Observatory fetcher.
//!
//! The GHO API is OData-flavored: one collection per indicator code,
//! filtered with `$filter=SpatialDim eq '<country>' and TimeDim ge ... `.
//! Responses wrap the rows in `{"value": [...]}`.

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

/// Fetcher for the WHO GHO API.
#[derive(Debug, Clone)]
pub struct WhoSource {
    base_url: String,
    country: String,
    timeout: Duration,
}

impl WhoSource {
    /// Create a fetcher from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.who_base_url.trim_end_matches('/').to_string(),
            country: config.country_code.clone(),
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    /// Unwrap and normalize one GHO response body.
    ///
    /// The GHO filter is re-checked client-side: the API is known to return
    /// rows for other spatial dimensions when the filter is malformed or
    /// silently ignored.
    fn parse_response(&self, code: &str, body: &Value) -> Result<Vec<IndicatorRecord>, SourceError> {
        let rows = body
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::MalformedPayload {
                source_id: SourceId::Who,
                reason: "missing 'value' array".to_string(),
            })?;

        let mut dropped = 0u64;
        let mut records: Vec<IndicatorRecord> = rows
            .iter()
            .filter(|item| {
                item.get("SpatialDim")
                    .and_then(Value::as_str)
                    .map(|dim| dim == self.country)
                    .unwrap_or(false)
            })
            .filter_map(|item| {
                let record = normalize(code, item, SourceId::Who);
                if record.is_none() {
                    dropped += 1;
                }
                record
            })
            .collect();

        metrics::inc_items_dropped(SourceId::Who, dropped);
        records.sort_by_key(|r| r.year.unwrap_or(0));
        Ok(records)
    }
}

#[async_trait]
impl IndicatorSource for WhoSource {
    fn id(&self) -> SourceId {
        SourceId::Who
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self, client), fields(source = "who"))]
    async fn fetch_indicator(
        &self,
        client: &reqwest::Client,
        code: &str,
        range: YearRange,
    ) -> Result<Vec<IndicatorRecord>, SourceError> {
        let url = format!("{}/{}", self.base_url, code);
        let filter = format!(
            "SpatialDim eq '{}' and TimeDim ge {} and TimeDim le {}",
            self.country, range.start, range.end
        );

        let body = get_json(client, &url, &[("$filter", filter)], SourceId::Who, code).await?;
        self.parse_response(code, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn source() -> WhoSource {
        WhoSource::new(&Config::default())
    }

    #[test]
    fn parses_and_sorts_rows() {
        let body = json!({
            "value": [
                { "IndicatorCode": "WHOSIS_000001", "SpatialDim": "UGA", "TimeDim": 2021, "NumericValue": 63.1 },
                { "IndicatorCode": "WHOSIS_000001", "SpatialDim": "UGA", "TimeDim": 2019, "NumericValue": 62.7 }
            ]
        });

        let records = source().parse_response("WHOSIS_000001", &body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(2019));
        assert_eq!(records[1].year, Some(2021));
    }

    #[test]
    fn filters_foreign_spatial_dims() {
        let body = json!({
            "value": [
                { "SpatialDim": "KEN", "TimeDim": 2020, "NumericValue": 1.0 },
                { "SpatialDim": "UGA", "TimeDim": 2020, "NumericValue": 2.0 }
            ]
        });

        let records = source().parse_response("WHS9_86", &body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, Some(2.0));
    }

    #[test]
    fn missing_value_wrapper_is_malformed() {
        let body = json!({ "rows": [] });
        let err = source().parse_response("WHS9_86", &body).unwrap_err();
        assert!(matches!(err, SourceError::MalformedPayload { .. }));
    }

    #[test]
    fn rows_without_value_are_kept_as_null() {
        let body = json!({
            "value": [
                { "SpatialDim": "UGA", "TimeDim": 2020 }
            ]
        });

        let records = source().parse_response("HIV_0000000026", &body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, None);
    }
}
