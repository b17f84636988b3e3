//! Normalization of raw upstream response items into [`IndicatorRecord`]s.
//!
//! Each upstream returns a different shape; `normalize` is the single pure
//! seam that flattens them. A malformed item never aborts a fetch: callers
//! skip `None` and keep processing sibling items.

use serde_json::Value;

use crate::indicator::{IndicatorRecord, SourceId};

/// Convert one raw API response item into a uniform record.
///
/// `code` is the requested indicator code and is used verbatim unless the
/// upstream item carries its own identifier (World Bank does). Missing keys
/// become `None` fields; only an item that is not a JSON object at all is
/// rejected.
pub fn normalize(code: &str, raw: &Value, source: SourceId) -> Option<IndicatorRecord> {
    if !raw.is_object() {
        return None;
    }

    match source {
        SourceId::Who => Some(IndicatorRecord {
            indicator_code: code.to_string(),
            indicator_name: str_field(raw, "IndicatorCode").unwrap_or_default(),
            year: parse_year(raw.get("TimeDim")),
            value: parse_value(raw.get("NumericValue")),
            display_value: str_field(raw, "DisplayValue"),
            dim1: str_field(raw, "Dim1"),
            dim2: str_field(raw, "Dim2"),
            dim3: str_field(raw, "Dim3"),
        }),
        SourceId::WorldBank => {
            let indicator = raw.get("indicator");
            let upstream_code = indicator
                .and_then(|i| i.get("id"))
                .and_then(Value::as_str)
                .unwrap_or(code);
            let name = indicator
                .and_then(|i| i.get("value"))
                .and_then(Value::as_str)
                .unwrap_or_default();

            Some(IndicatorRecord {
                indicator_code: upstream_code.to_string(),
                indicator_name: name.to_string(),
                year: parse_year(raw.get("date")),
                value: parse_value(raw.get("value")),
                display_value: None,
                dim1: None,
                dim2: None,
                dim3: None,
            })
        }
        SourceId::Unesco => Some(IndicatorRecord {
            indicator_code: code.to_string(),
            indicator_name: String::new(),
            year: parse_year(raw.get("TIME_PERIOD")),
            value: parse_value(raw.get("OBS_VALUE")),
            display_value: None,
            dim1: None,
            dim2: None,
            dim3: None,
        }),
        // REST Countries items are whole country objects; the requested
        // "code" names the numeric field to lift out (population, area).
        SourceId::RestCountries => Some(IndicatorRecord {
            indicator_code: code.to_string(),
            indicator_name: String::new(),
            year: None,
            value: parse_value(raw.get(code)),
            display_value: None,
            dim1: None,
            dim2: None,
            dim3: None,
        }),
    }
}

/// Coerce a year field to an integer.
///
/// Sources disagree on the encoding: WHO sends integers, World Bank sends
/// numeric strings. Non-numeric strings become `None` and the record is
/// excluded from derived statistics downstream.
fn parse_year(raw: Option<&Value>) -> Option<i32> {
    let raw = raw?;
    if let Some(n) = raw.as_i64() {
        return i32::try_from(n).ok();
    }
    raw.as_str()?.trim().parse::<i32>().ok()
}

/// Coerce a value field to a float; upstream nulls stay `None`.
fn parse_value(raw: Option<&Value>) -> Option<f64> {
    let raw = raw?;
    if let Some(v) = raw.as_f64() {
        return Some(v);
    }
    // Some upstreams encode observations as strings.
    raw.as_str()?.trim().parse::<f64>().ok()
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}
