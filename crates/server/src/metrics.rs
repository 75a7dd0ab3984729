//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Weatharr server:
//! - HTTP request metrics (latency, counts)
//! - Display loop status (collected dynamically)
//! - Core metrics from the scheduler, cache and display loop

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "weatharr_http_request_duration_seconds",
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
        Opts::new("weatharr_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "weatharr_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Display Metrics (collected dynamically)
// =============================================================================

/// Display loop running state (1 = running, 0 = stopped).
pub static DISPLAY_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "weatharr_display_running",
        "Whether the display orchestrator is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Frames rendered since startup.
pub static FRAMES_RENDERED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "weatharr_frames_rendered",
        "Number of frames rendered since startup",
    )
    .unwrap()
});

/// Whether a snapshot is cached per category (1 = cached, 0 = never fetched).
pub static FEED_CACHED: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "weatharr_feed_cached",
            "Whether a snapshot is cached for the category",
        ),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Display
    registry
        .register(Box::new(DISPLAY_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(FRAMES_RENDERED.clone()))
        .unwrap();
    registry.register(Box::new(FEED_CACHED.clone())).unwrap();

    // Core metrics (scheduler, cache, rotator, ticker)
    for metric in weatharr_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the orchestrator right now.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let status = state.orchestrator().status().await;
    DISPLAY_RUNNING.set(if status.running { 1 } else { 0 });
    FRAMES_RENDERED.set(status.frames_rendered as i64);

    for overview in &status.cache {
        FEED_CACHED
            .with_label_values(&[overview.category.as_str()])
            .set(if overview.staleness.is_some() { 1 } else { 0 });
    }
}

/// Normalize a path for metric labels (replace numeric segments with a
/// placeholder).
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
