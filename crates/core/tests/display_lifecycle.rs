//! Display loop integration tests.
//!
//! These tests drive the render loop against a populated cache:
//! feeds land in the cache -> rotator cycles panels -> ticker composes
//! alerts and headlines -> frames reach the sink.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use weatharr_core::{
    config::FeedsConfig,
    load_config_from_str,
    testing::{fixtures, MockFeedSource, RecordingDisplaySink},
    DisplayContext, DisplayOrchestrator, FeedCache, FeedCategory, FeedSource, MissingPanelPolicy,
    Panel, PanelStaleness, RotationConfig, TickerConfig,
};

/// Test helper owning a cache and a context with a controllable clock.
struct TestHarness {
    cache: Arc<FeedCache>,
    context: DisplayContext,
    start: Instant,
}

impl TestHarness {
    fn new(missing_panel: MissingPanelPolicy) -> Self {
        let cache = Arc::new(FeedCache::from_config(&FeedsConfig::default()));
        let rotation = RotationConfig {
            default_dwell_secs: 5.0,
            missing_panel,
            ..Default::default()
        };
        let ticker = TickerConfig {
            scroll_rate: 10.0,
            separator: " | ".to_string(),
            idle_message: "Weather data loading...".to_string(),
            visible_width: 40,
        };
        let start = Instant::now();
        let context = DisplayContext::new(Arc::clone(&cache), rotation, ticker, start);

        Self {
            cache,
            context,
            start,
        }
    }

    fn put(&self, category: FeedCategory) {
        self.cache
            .put(category, fixtures::payload_for(category), Utc::now())
            .unwrap();
    }

    fn tick_at(&mut self, secs: f64) -> weatharr_core::DisplaySnapshot {
        self.context
            .render_tick(self.start + Duration::from_secs_f64(secs), Utc::now())
    }
}

#[test]
fn test_full_rotation_with_all_panels_present() {
    let mut harness = TestHarness::new(MissingPanelPolicy::Placeholder);
    for category in FeedCategory::ALL {
        harness.put(category);
    }

    let mut seen = vec![harness.tick_at(0.0).active_panel];
    for i in 1..=Panel::ORDER.len() {
        seen.push(harness.tick_at(i as f64 * 5.5).active_panel);
    }

    let mut expected: Vec<Panel> = Panel::ORDER.to_vec();
    expected.push(Panel::ORDER[0]);
    assert_eq!(seen, expected);
}

#[test]
fn test_placeholder_panels_are_shown_as_absent() {
    let mut harness = TestHarness::new(MissingPanelPolicy::Placeholder);
    harness.put(FeedCategory::Radar);

    let first = harness.tick_at(0.0);
    assert_eq!(first.active_panel, Panel::CurrentConditions);
    assert_eq!(first.panel_staleness, PanelStaleness::Absent);
    assert!(first.panel.is_none());

    let second = harness.tick_at(5.5);
    assert_eq!(second.active_panel, Panel::Radar);
    assert_eq!(second.panel_staleness, PanelStaleness::Fresh);
    assert!(second.panel.is_some());
}

#[test]
fn test_skip_policy_lands_on_available_panel() {
    let mut harness = TestHarness::new(MissingPanelPolicy::Skip);
    harness.put(FeedCategory::TextForecast);

    let frame = harness.tick_at(0.0);
    assert_eq!(frame.active_panel, Panel::TextForecast);
    assert_eq!(frame.panel_staleness, PanelStaleness::Fresh);

    // Sole available panel stays put across dwell expiry.
    let frame = harness.tick_at(12.0);
    assert_eq!(frame.active_panel, Panel::TextForecast);
}

#[test]
fn test_ticker_follows_alerts_and_headlines() {
    let mut harness = TestHarness::new(MissingPanelPolicy::Placeholder);

    let idle = harness.tick_at(0.0);
    assert_eq!(idle.ticker_text, "Weather data loading...");
    let idle_generation = idle.ticker_generation;

    harness
        .cache
        .put(
            FeedCategory::Alerts,
            fixtures::alerts(&[("a1", "Heat Advisory")]),
            Utc::now(),
        )
        .unwrap();
    harness
        .cache
        .put(
            FeedCategory::Headlines,
            fixtures::headlines(&[("h1", "Port reopens"), ("h2", "Cooling centers open")]),
            Utc::now(),
        )
        .unwrap();

    let frame = harness.tick_at(0.1);
    assert!(frame.ticker_generation > idle_generation);
    assert_eq!(
        harness.context.ticker().stream_text(),
        "Heat Advisory | Port reopens | Cooling centers open | Heat Advisory | "
    );

    // Same ids again: no rebuild.
    let generation = frame.ticker_generation;
    harness
        .cache
        .put(
            FeedCategory::Alerts,
            fixtures::alerts(&[("a1", "Heat Advisory")]),
            Utc::now(),
        )
        .unwrap();
    assert_eq!(harness.tick_at(0.2).ticker_generation, generation);

    // Same ids, edited text: shown without a new generation.
    harness
        .cache
        .put(
            FeedCategory::Alerts,
            fixtures::alerts(&[("a1", "Heat Advisory extended")]),
            Utc::now(),
        )
        .unwrap();
    assert_eq!(harness.tick_at(0.25).ticker_generation, generation);
    assert_eq!(
        harness.context.ticker().stream_text(),
        "Heat Advisory extended | Port reopens | Cooling centers open | Heat Advisory extended | "
    );

    // Alerts cleared: headlines only.
    harness
        .cache
        .put(FeedCategory::Alerts, fixtures::alerts(&[]), Utc::now())
        .unwrap();
    let frame = harness.tick_at(0.3);
    assert!(frame.ticker_generation > generation);
    assert_eq!(
        harness.context.ticker().stream_text(),
        "Port reopens | Cooling centers open | "
    );
}

#[tokio::test]
async fn test_orchestrator_end_to_end() {
    let config = load_config_from_str(
        r#"
[station]
latitude = 29.735
longitude = -94.977

[rotation]
default_dwell_secs = 0.1

[display]
render_interval_ms = 10
shutdown_grace_ms = 500
"#,
    )
    .unwrap();

    let sources: Vec<Arc<dyn FeedSource>> = FeedCategory::ALL
        .iter()
        .map(|c| {
            Arc::new(MockFeedSource::new(*c).with_fallback(Ok(fixtures::payload_for(*c))))
                as Arc<dyn FeedSource>
        })
        .collect();
    let sink = Arc::new(RecordingDisplaySink::new());

    let orchestrator = DisplayOrchestrator::from_config(&config, sources, sink.clone()).unwrap();
    orchestrator.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    let status = orchestrator.status().await;
    orchestrator.stop().await.unwrap();

    assert!(status.running);
    assert_eq!(status.scheduler.feeds.len(), FeedCategory::ALL.len());
    assert!(status.cache.iter().all(|c| c.staleness.is_some()));

    let frames = sink.frames();
    let panels: std::collections::HashSet<_> = frames.iter().map(|f| f.active_panel).collect();
    assert!(panels.len() > 1, "rotator should have moved past the first panel");
    assert!(frames
        .last()
        .map(|f| f.ticker_text != "Weather data loading...")
        .unwrap_or(false));
}
