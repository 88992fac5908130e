//! Backend request metrics

use std::time::Duration;

/// Record one engine round trip
pub fn record_request(op: &'static str, duration: Duration, ok: bool) {
    metrics::counter!(
        "facetscope_backend_requests_total",
        "op" => op,
        "status" => if ok { "ok" } else { "error" },
    )
    .increment(1);

    metrics::histogram!(
        "facetscope_backend_request_duration_seconds",
        "op" => op,
    )
    .record(duration.as_secs_f64());
}
