//! Dispatch and middleware metrics.
//!
//! Recorded through the `metrics` facade. Without an installed recorder
//! every call is a no-op, so the route layer never requires one.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::sync::Once;
use std::time::Duration;

static DESCRIBE: Once = Once::new();

/// Registers descriptions for all restfluent metrics.
///
/// Called by the route registration pass, so install a recorder before
/// registering routes. Safe to call repeatedly; descriptions are registered once.
pub fn describe_metrics() {
    DESCRIBE.call_once(|| {
        describe_counter!(
            "restfluent_dispatch_total",
            "Total number of dispatch runs completed"
        );
        describe_histogram!(
            "restfluent_dispatch_duration_seconds",
            "Dispatch duration in seconds, middleware included"
        );
        describe_counter!(
            "restfluent_rate_limited_total",
            "Total requests rejected by a rate limit policy"
        );
        describe_counter!(
            "restfluent_middleware_passthrough_total",
            "Total unresolved middleware references skipped"
        );
    });
}

/// Returns true once [`describe_metrics`] has run.
pub fn metrics_described() -> bool {
    DESCRIBE.is_completed()
}

/// Records a completed dispatch run.
pub fn record_dispatch(route: &str, method: &str, status_code: u16, duration: Duration) {
    counter!(
        "restfluent_dispatch_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        "restfluent_dispatch_duration_seconds",
        "route" => route.to_string(),
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request rejected by a rate limit policy.
pub fn record_rate_limited(policy: &str) {
    counter!(
        "restfluent_rate_limited_total",
        "policy" => policy.to_string()
    )
    .increment(1);
}

/// Records an unresolved middleware reference that was skipped.
pub fn record_middleware_passthrough(reference: &str) {
    counter!(
        "restfluent_middleware_passthrough_total",
        "reference" => reference.to_string()
    )
    .increment(1);
}
