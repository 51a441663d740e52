//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with SLO-aligned histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all NoteGraph metrics
pub const METRICS_PREFIX: &str = "notegraph";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.075,  // 75ms
    0.100,  // 100ms
    0.150,  // 150ms - P99 target
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Citation graph metrics
    describe_counter!(
        format!("{}_citations_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total citation relationships created"
    );

    describe_counter!(
        format!("{}_citations_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Total citation relationships deleted"
    );

    describe_counter!(
        format!("{}_citation_reorders_total", METRICS_PREFIX),
        Unit::Count,
        "Total citation reorder operations"
    );

    // Render metrics
    describe_counter!(
        format!("{}_renders_total", METRICS_PREFIX),
        Unit::Count,
        "Total citation render requests"
    );

    describe_histogram!(
        format!("{}_render_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Citation render latency in seconds"
    );

    describe_gauge!(
        format!("{}_render_references_count", METRICS_PREFIX),
        Unit::Count,
        "Number of references produced by the last render"
    );

    describe_counter!(
        format!("{}_render_unresolved_markers_total", METRICS_PREFIX),
        Unit::Count,
        "Total markers that could not be resolved during rendering"
    );

    // Database metrics
    describe_histogram!(
        format!("{}_db_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Database query latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a citation graph mutation
pub fn record_citation_mutation(operation: &str) {
    let name = match operation {
        "create" => format!("{}_citations_created_total", METRICS_PREFIX),
        "delete" => format!("{}_citations_deleted_total", METRICS_PREFIX),
        "reorder" => format!("{}_citation_reorders_total", METRICS_PREFIX),
        _ => return,
    };
    counter!(name).increment(1);
}

/// Helper to record render metrics
pub fn record_render(duration_secs: f64, style: &str, reference_count: usize, unresolved: usize) {
    counter!(
        format!("{}_renders_total", METRICS_PREFIX),
        "style" => style.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_render_duration_seconds", METRICS_PREFIX),
        "style" => style.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_render_references_count", METRICS_PREFIX),
        "style" => style.to_string()
    )
    .set(reference_count as f64);

    if unresolved > 0 {
        counter!(format!("{}_render_unresolved_markers_total", METRICS_PREFIX))
            .increment(unresolved as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // P50 target (50ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.050));
        // P99 target (150ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.150));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/api/citations/render");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }

    #[test]
    fn test_record_helpers() {
        record_citation_mutation("create");
        record_citation_mutation("unknown");
        record_render(0.005, "APA", 3, 1);
    }
}
