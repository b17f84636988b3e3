//! Derived-statistic helpers over normalized indicator records.
//!
//! Records missing either year or value never participate here; they are
//! retained only for raw listings.

use crate::indicator::IndicatorRecord;

/// Default minimum year span required by [`growth_rate`].
pub const DEFAULT_MIN_SPAN_YEARS: i32 = 5;

/// The record with the maximum numeric year, or `None` for empty input.
///
/// Ties on year return an arbitrary maximal element; upstreams do not
/// define an ordering within a year.
pub fn latest(records: &[IndicatorRecord]) -> Option<&IndicatorRecord> {
    records
        .iter()
        .filter(|r| r.is_plottable())
        .max_by_key(|r| r.year)
}

/// Compound annual growth rate across the observation window, in percent.
///
/// Computed as `(last/first)^(1/span) - 1` over the earliest and latest
/// usable observations. Returns `None` when fewer than two usable records
/// exist, when the span is zero or below `min_span_years`, or when the
/// earliest value is not positive (guards the root and division).
pub fn growth_rate(records: &[IndicatorRecord], min_span_years: i32) -> Option<f64> {
    let mut points: Vec<(i32, f64)> = records
        .iter()
        .filter_map(|r| Some((r.year?, r.value?)))
        .collect();

    if points.len() < 2 {
        return None;
    }

    points.sort_by_key(|(year, _)| *year);
    let (first_year, first_value) = points[0];
    let (last_year, last_value) = points[points.len() - 1];

    let span = last_year - first_year;
    if span <= 0 || span < min_span_years {
        return None;
    }

    if first_value <= 0.0 {
        return None;
    }

    let rate = ((last_value / first_value).powf(1.0 / f64::from(span)) - 1.0) * 100.0;
    rate.is_finite().then_some(rate)
}

/// Render a value with B/M/K suffixes and one decimal place.
///
/// `None` renders as the literal "N/A"; non-finite values fall back to
/// their plain string representation instead of failing.
pub fn format_large_number(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "N/A".to_string();
    };

    if !v.is_finite() {
        return format!("{v}");
    }

    if v >= 1_000_000_000.0 {
        format!("{:.1}B", v / 1_000_000_000.0)
    } else if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        format!("{v:.1}")
    }
}
