//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the tales server:
//! - HTTP request metrics (latency, counts)
//! - Render pushes received from the visual back-end
//! - Orchestrator status (collected dynamically)
//! - Core pipeline metrics (generation, splicing, encoding)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    if let Err(e) = register_metrics(&registry) {
        error!(error = %e, "Failed to register metrics");
    }
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tales_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tales_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tales_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Render Metrics
// =============================================================================

/// Payloads pushed to the render page.
pub static RENDER_PUSHES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tales_render_pushes_total",
        "Total payloads pushed to the render page",
    )
    .unwrap()
});

// =============================================================================
// Orchestrator Metrics (collected dynamically)
// =============================================================================

/// Orchestrator running state (1 = running, 0 = stopped).
pub static ORCHESTRATOR_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tales_orchestrator_running",
        "Whether the orchestrator is running (1) or stopped (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

/// Registers the server metrics and every core metric into `registry`.
pub fn register_metrics(registry: &Registry) -> prometheus::Result<()> {
    // HTTP
    registry.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    registry.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    registry.register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))?;

    // Render
    registry.register(Box::new(RENDER_PUSHES_TOTAL.clone()))?;

    // Orchestrator
    registry.register(Box::new(ORCHESTRATOR_RUNNING.clone()))?;

    // Core metrics (generation, splicing, encoder, dispatches)
    for metric in tales_core::metrics::all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the orchestrator's current status.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Some(orchestrator) = state.orchestrator() {
        let status = orchestrator.status();
        ORCHESTRATOR_RUNNING.set(if status.running { 1 } else { 0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_register_into_fresh_registry() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();
        RENDER_PUSHES_TOTAL.inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "tales_render_pushes_total"));
    }

    #[test]
    fn test_registering_twice_fails() {
        let registry = Registry::new();
        assert_ok!(register_metrics(&registry));
        assert_err!(register_metrics(&registry));
    }

    #[test]
    fn test_encode_metrics() {
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        let text = encode_metrics().unwrap();
        assert!(text.contains("tales_http_requests_in_flight"));
    }
}
