//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Unit generation (per role latency and outcome)
//! - Node processing and splicing (finalized / failed nodes by stage)
//! - Encoder invocations (mux / concat)
//! - Dispatches handled by the orchestrator

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Generation Metrics
// =============================================================================

/// Units generated by role and result.
pub static UNITS_GENERATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tales_units_generated_total", "Total unit generation calls"),
        &["role", "result"], // result: "success" or an error kind
    )
    .unwrap()
});

/// Generation latency in seconds by role.
pub static GENERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tales_generation_duration_seconds",
            "Duration of a single unit generation call",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["role"],
    )
    .unwrap()
});

// =============================================================================
// Tree Metrics
// =============================================================================

/// Nodes that reached a terminal state, by stage.
pub static NODES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tales_nodes_total", "Total nodes processed"),
        &["stage", "result"], // stage: "generate", "assemble", "splice"
    )
    .unwrap()
});

// =============================================================================
// Encoder Metrics
// =============================================================================

/// Encoder invocations by mode and result.
pub static ENCODER_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tales_encoder_invocations_total", "Total encoder invocations"),
        &["mode", "result"], // mode: "mux", "concat"
    )
    .unwrap()
});

/// Encoder invocation duration in seconds.
pub static ENCODER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tales_encoder_duration_seconds",
            "Duration of a single encoder invocation",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["mode"],
    )
    .unwrap()
});

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Dispatches finished by result.
pub static DISPATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tales_dispatches_total", "Total root dispatches"),
        &["result"], // "finalized", "failed"
    )
    .unwrap()
});

/// Dispatches currently in flight.
pub static DISPATCHES_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tales_dispatches_in_flight",
        "Number of root dispatches currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Generation
        Box::new(UNITS_GENERATED.clone()),
        Box::new(GENERATION_DURATION.clone()),
        // Tree
        Box::new(NODES_TOTAL.clone()),
        // Encoder
        Box::new(ENCODER_INVOCATIONS.clone()),
        Box::new(ENCODER_DURATION.clone()),
        // Orchestrator
        Box::new(DISPATCHES_TOTAL.clone()),
        Box::new(DISPATCHES_IN_FLIGHT.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        UNITS_GENERATED.with_label_values(&["audio", "success"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "tales_units_generated_total"));
    }
}
