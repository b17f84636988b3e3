//! Core data model: indicator records, batches, and the response envelope.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Identifies one of the upstream statistical APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// WHO Global Health Observatory.
    Who,
    /// World Bank open data.
    WorldBank,
    /// UNESCO Institute for Statistics.
    Unesco,
    /// REST Countries.
    RestCountries,
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceId::Who => "who",
            SourceId::WorldBank => "world_bank",
            SourceId::Unesco => "unesco",
            SourceId::RestCountries => "rest_countries",
        };
        f.write_str(name)
    }
}

/// Inclusive year window for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    /// First year, inclusive.
    pub start: i32,
    /// Last year, inclusive.
    pub end: i32,
}

impl YearRange {
    /// Build a range; clamps an inverted pair into order.
    pub fn new(start: i32, end: i32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }
}

/// One observation of one indicator for one country in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// Upstream-defined indicator identifier.
    pub indicator_code: String,

    /// Human-readable label; empty when the source omits it.
    #[serde(default)]
    pub indicator_name: String,

    /// Observation year. `None` when absent or non-numeric upstream.
    pub year: Option<i32>,

    /// Observed value. Absent observations stay `None`, never zero.
    pub value: Option<f64>,

    /// WHO display string, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,

    /// WHO descriptive dimension 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim1: Option<String>,

    /// WHO descriptive dimension 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim2: Option<String>,

    /// WHO descriptive dimension 3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim3: Option<String>,
}

impl IndicatorRecord {
    /// True when the record can feed derived statistics.
    pub fn is_plottable(&self) -> bool {
        self.year.is_some() && self.value.is_some()
    }
}

/// Records for one indicator code plus its display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSeries {
    /// Human-readable indicator name.
    pub name: String,
    /// Observations, in upstream order.
    pub data: Vec<IndicatorRecord>,
}

/// Mapping from indicator code to its series.
///
/// Always holds one entry per requested code; a failed fetch yields an
/// entry with empty `data`, never an absent key.
pub type IndicatorBatch = HashMap<String, IndicatorSeries>;

/// Uniform top-level response wrapper returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// "success" or "error".
    pub status: String,

    /// Payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Failure description, present on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// ISO-8601 timestamp generated at response-assembly time.
    pub last_updated: String,
}

impl<T> Envelope<T> {
    /// Wrap a successful payload.
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
            last_updated: now_rfc3339(),
        }
    }

    /// Wrap a failure message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.into()),
            last_updated: now_rfc3339(),
        }
    }
}

/// Current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// One point of a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Observation year.
    pub year: i32,
    /// Observed value.
    pub value: f64,
}

/// Chart-ready series for one indicator: only rows with both year and
/// value, sorted ascending by year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSeries {
    /// Indicator code.
    pub indicator: String,
    /// Human-readable indicator name.
    pub indicator_name: String,
    /// Sorted observation points.
    pub data_points: Vec<TrendPoint>,
}

/// Derived headline statistics for one indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCard {
    /// Indicator code.
    pub code: String,
    /// Human-readable indicator name.
    pub name: String,
    /// Year of the most recent usable observation.
    pub latest_year: Option<i32>,
    /// Most recent usable value.
    pub latest_value: Option<f64>,
    /// `latest_value` rendered with B/M/K suffixes, or "N/A".
    pub display_value: String,
    /// Compound annual growth rate over the window, percent.
    pub growth_rate_pct: Option<f64>,
}

/// Country facts from REST Countries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryProfile {
    /// Common country name.
    pub name: String,
    /// Capital city, when listed.
    pub capital: Option<String>,
    /// UN region.
    pub region: Option<String>,
    /// Subregion.
    pub subregion: Option<String>,
    /// Total population.
    pub population: Option<f64>,
    /// Land area in square kilometres.
    pub area_km2: Option<f64>,
    /// Official language names.
    pub languages: Vec<String>,
    /// Currency names.
    pub currencies: Vec<String>,
    /// Flag emoji.
    pub flag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_shape() {
        let env = Envelope::success(vec![1, 2, 3]);
        assert_eq!(env.status, "success");
        assert!(env.data.is_some());
        assert!(env.message.is_none());
        assert!(!env.last_updated.is_empty());
    }

    #[test]
    fn envelope_error_shape() {
        let env = Envelope::<()>::error("upstream unreachable");
        assert_eq!(env.status, "error");
        assert!(env.data.is_none());
        assert_eq!(env.message.as_deref(), Some("upstream unreachable"));
    }

    #[test]
    fn envelope_error_serializes_without_data_key() {
        let env = Envelope::<()>::error("boom");
        let json = serde_json::to_value(&env).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["status"], "error");
    }

    #[test]
    fn year_range_reorders_inverted_bounds() {
        let range = YearRange::new(2023, 2018);
        assert_eq!(range.start, 2018);
        assert_eq!(range.end, 2023);
    }

    #[test]
    fn record_plottable_requires_year_and_value() {
        let mut record = IndicatorRecord {
            indicator_code: "SP.POP.TOTL".to_string(),
            indicator_name: String::new(),
            year: Some(2021),
            value: Some(47_100_000.0),
            display_value: None,
            dim1: None,
            dim2: None,
            dim3: None,
        };
        assert!(record.is_plottable());

        record.value = None;
        assert!(!record.is_plottable());
    }
}
