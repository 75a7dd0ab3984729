//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Refresh scheduler (fetch attempts, durations, failure streaks)
//! - Feed cache (snapshot ages)
//! - Display loop (panel transitions, ticker rebuilds, render ticks)

use once_cell::sync::Lazy;
use prometheus::{
    GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
};

// =============================================================================
// Refresh Scheduler Metrics
// =============================================================================

/// Fetch attempts by category and result.
pub static FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("weatharr_fetch_attempts_total", "Total feed fetch attempts"),
        &["category", "result"], // result: "success", "network", "parse", "upstream", "timeout"
    )
    .unwrap()
});

/// Fetch duration in seconds.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "weatharr_fetch_duration_seconds",
            "Duration of a single feed fetch",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0]),
        &["category"],
    )
    .unwrap()
});

/// Current run of consecutive failures per category.
pub static CONSECUTIVE_FAILURES: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "weatharr_feed_consecutive_failures",
            "Consecutive failed fetches per feed",
        ),
        &["category"],
    )
    .unwrap()
});

/// Feeds with a running refresh task.
pub static FEEDS_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "weatharr_feeds_running",
        "Number of feeds with an active refresh task",
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Age of the cached snapshot per category, updated at each render tick.
pub static SNAPSHOT_AGE: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new(
            "weatharr_snapshot_age_seconds",
            "Age of the latest cached snapshot",
        ),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Display Metrics
// =============================================================================

/// Panel transitions by destination panel.
pub static PANEL_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("weatharr_panel_transitions_total", "Total panel transitions"),
        &["panel"],
    )
    .unwrap()
});

/// Ticker stream rebuilds.
pub static TICKER_REBUILDS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "weatharr_ticker_rebuilds_total",
        "Number of times the ticker stream was recomposed",
    )
    .unwrap()
});

/// Current ticker generation.
pub static TICKER_GENERATION: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "weatharr_ticker_generation",
        "Generation of the composed ticker stream",
    )
    .unwrap()
});

/// Snapshots handed to the display sink.
pub static RENDER_TICKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("weatharr_render_ticks_total", "Total render ticks"),
        &["result"], // "ok", "sink_error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Scheduler
        Box::new(FETCH_ATTEMPTS.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(CONSECUTIVE_FAILURES.clone()),
        Box::new(FEEDS_RUNNING.clone()),
        // Cache
        Box::new(SNAPSHOT_AGE.clone()),
        // Display
        Box::new(PANEL_TRANSITIONS.clone()),
        Box::new(TICKER_REBUILDS.clone()),
        Box::new(TICKER_GENERATION.clone()),
        Box::new(RENDER_TICKS.clone()),
    ]
}
