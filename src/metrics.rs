//! Prometheus metrics for dispatch outcomes and probe latency.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};

// === Metric Name Constants ===

/// Dispatched requests counter metric name.
pub const METRIC_REQUESTS_TOTAL: &str = "stackwatch_requests_total";
/// Transport-failure counter metric name.
pub const METRIC_REQUEST_FAILURES: &str = "stackwatch_request_failures_total";
/// Probe latency histogram metric name.
pub const METRIC_PROBE_LATENCY: &str = "stackwatch_probe_latency_ms";
/// Healthy probe counter metric name.
pub const METRIC_PROBES_HEALTHY: &str = "stackwatch_probes_healthy_total";
/// Unreachable probe counter metric name.
pub const METRIC_PROBES_UNREACHABLE: &str = "stackwatch_probes_unreachable_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_REQUESTS_TOTAL,
        "Requests dispatched to downstream services"
    );
    describe_counter!(
        METRIC_REQUEST_FAILURES,
        "Requests that failed at the transport level"
    );
    describe_histogram!(METRIC_PROBE_LATENCY, "Health probe latency in milliseconds");
    describe_counter!(METRIC_PROBES_HEALTHY, "Health probes that reached the service");
    describe_counter!(
        METRIC_PROBES_UNREACHABLE,
        "Health probes that could not reach the service"
    );
}

/// Record a completed dispatch and the status it returned.
pub fn record_dispatch(endpoint: &str, status: u16) {
    counter!(
        METRIC_REQUESTS_TOTAL,
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
}

/// Record a transport-level dispatch failure.
pub fn record_dispatch_failure(endpoint: &str) {
    counter!(
        METRIC_REQUEST_FAILURES,
        "endpoint" => endpoint.to_string(),
    )
    .increment(1);
}

/// Record the outcome and latency of one health probe.
pub fn record_probe(service: &str, healthy: bool, started: Instant) {
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_PROBE_LATENCY, "service" => service.to_string()).record(elapsed_ms);

    let name = if healthy {
        METRIC_PROBES_HEALTHY
    } else {
        METRIC_PROBES_UNREACHABLE
    };
    counter!(name, "service" => service.to_string()).increment(1);
}
