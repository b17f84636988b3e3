//! Fetch-outcome counters.
//!
//! Counters distinguish upstream failures from malformed payloads even
//! though both degrade to an empty series for callers. Emitted through the
//! `metrics` facade; the embedder decides whether a recorder is installed.

use metrics::{counter, describe_counter};

use crate::indicator::SourceId;

/// Successful per-code fetches.
pub const METRIC_FETCH_OK: &str = "indicator_fetch_ok_total";
/// Per-code fetches that failed (timeout, non-2xx, transport).
pub const METRIC_FETCH_FAILED: &str = "indicator_fetch_failed_total";
/// Individual response items dropped during normalization.
pub const METRIC_ITEMS_DROPPED: &str = "indicator_items_dropped_total";
/// Proxy requests rejected by the allow-list.
pub const METRIC_PROXY_REJECTED: &str = "proxy_rejected_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_FETCH_OK, "Total successful per-indicator fetches");
    describe_counter!(
        METRIC_FETCH_FAILED,
        "Total per-indicator fetches degraded to an empty series"
    );
    describe_counter!(
        METRIC_ITEMS_DROPPED,
        "Total malformed response items skipped during normalization"
    );
    describe_counter!(
        METRIC_PROXY_REJECTED,
        "Total proxy requests rejected before any outbound call"
    );
}

/// Record a successful per-code fetch.
pub fn inc_fetch_ok(source: SourceId) {
    counter!(METRIC_FETCH_OK, "source" => source.to_string()).increment(1);
}

/// Record a per-code fetch that degraded to an empty series.
pub fn inc_fetch_failed(source: SourceId) {
    counter!(METRIC_FETCH_FAILED, "source" => source.to_string()).increment(1);
}

/// Record malformed items dropped by the normalizer.
pub fn inc_items_dropped(source: SourceId, count: u64) {
    if count > 0 {
        counter!(METRIC_ITEMS_DROPPED, "source" => source.to_string()).increment(count);
    }
}

/// Record a proxy request rejected by the allow-list.
pub fn inc_proxy_rejected() {
    counter!(METRIC_PROXY_REJECTED).increment(1);
}
