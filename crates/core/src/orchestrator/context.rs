//! Per-frame display state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::cache::{FeedCache, FeedSnapshot};
use crate::display::{DisplaySnapshot, PanelStaleness};
use crate::feed::FeedCategory;
use crate::metrics;
use crate::rotator::{PanelRotator, RotationConfig};
use crate::ticker::{TickerCompositor, TickerConfig};

type ChangeReceiver = watch::Receiver<Option<Arc<FeedSnapshot>>>;

/// Everything the render loop mutates: rotator, ticker and the change
/// receivers for the ticker's categories.
///
/// `render_tick` is synchronous, so frames can be produced deterministically
/// in tests by supplying the clock.
pub struct DisplayContext {
    cache: Arc<FeedCache>,
    rotator: PanelRotator,
    ticker: TickerCompositor,
    alerts_rx: Option<ChangeReceiver>,
    headlines_rx: Option<ChangeReceiver>,
    last_tick: Option<Instant>,
}

impl DisplayContext {
    pub fn new(
        cache: Arc<FeedCache>,
        rotation: RotationConfig,
        ticker: TickerConfig,
        now: Instant,
    ) -> Self {
        let alerts_rx = cache.subscribe(FeedCategory::Alerts);
        let headlines_rx = cache.subscribe(FeedCategory::Headlines);

        Self {
            cache,
            rotator: PanelRotator::new(rotation, now),
            ticker: TickerCompositor::new(ticker),
            alerts_rx,
            headlines_rx,
            last_tick: None,
        }
    }

    pub fn rotator(&self) -> &PanelRotator {
        &self.rotator
    }

    pub fn ticker(&self) -> &TickerCompositor {
        &self.ticker
    }

    /// Produce one frame.
    ///
    /// `now` drives rotation and scrolling; `wall` is used for staleness and
    /// the frame timestamp.
    pub fn render_tick(&mut self, now: Instant, wall: DateTime<Utc>) -> DisplaySnapshot {
        if take_change(&mut self.alerts_rx) | take_change(&mut self.headlines_rx) {
            self.ticker.mark_changed();
        }

        let dt = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);

        let cache = &self.cache;
        self.rotator
            .tick(now, |panel| cache.get(panel.category()).is_some());
        self.ticker.tick(dt, cache);

        for category in FeedCategory::ALL {
            if let Some(snapshot) = cache.get(category) {
                metrics::SNAPSHOT_AGE
                    .with_label_values(&[category.as_str()])
                    .set(snapshot.age(wall).num_milliseconds() as f64 / 1000.0);
            }
        }

        let active_panel = self.rotator.active_panel();
        let view = cache.view(active_panel.category(), wall);

        DisplaySnapshot {
            active_panel,
            panel_staleness: PanelStaleness::from(&view),
            panel: view.snapshot().cloned(),
            ticker_text: self.ticker.visible_text(),
            ticker_generation: self.ticker.generation(),
            rendered_at: wall,
        }
    }
}

/// Consume a pending change notification, if any.
fn take_change(rx: &mut Option<ChangeReceiver>) -> bool {
    match rx {
        Some(rx) if rx.has_changed().unwrap_or(false) => {
            rx.borrow_and_update();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedsConfig;
    use crate::rotator::{MissingPanelPolicy, Panel};
    use crate::testing::fixtures;

    fn cache() -> Arc<FeedCache> {
        Arc::new(FeedCache::from_config(&FeedsConfig::default()))
    }

    fn rotation() -> RotationConfig {
        RotationConfig {
            default_dwell_secs: 10.0,
            ..Default::default()
        }
    }

    fn ticker() -> TickerConfig {
        TickerConfig {
            scroll_rate: 4.0,
            separator: " | ".to_string(),
            idle_message: "Weather data loading...".to_string(),
            visible_width: 20,
        }
    }

    #[test]
    fn test_cold_start_frame() {
        let t0 = Instant::now();
        let mut context = DisplayContext::new(cache(), rotation(), ticker(), t0);
        let frame = context.render_tick(t0, Utc::now());

        assert_eq!(frame.active_panel, Panel::CurrentConditions);
        assert_eq!(frame.panel_staleness, PanelStaleness::Absent);
        assert!(frame.panel.is_none());
        assert_eq!(frame.ticker_text, "Weather data loading...");
        assert_eq!(frame.ticker_generation, 0);
    }

    #[test]
    fn test_frame_reflects_cache_and_ticker_updates() {
        let cache = cache();
        let t0 = Instant::now();
        let mut context = DisplayContext::new(Arc::clone(&cache), rotation(), ticker(), t0);
        context.render_tick(t0, Utc::now());

        cache
            .put(
                FeedCategory::CurrentConditions,
                fixtures::current_conditions("Sunny"),
                Utc::now(),
            )
            .unwrap();
        cache
            .put(
                FeedCategory::Alerts,
                fixtures::alerts(&[("a1", "Flood Watch")]),
                Utc::now(),
            )
            .unwrap();

        let frame = context.render_tick(t0 + Duration::from_millis(100), Utc::now());
        assert_eq!(frame.panel_staleness, PanelStaleness::Fresh);
        assert_eq!(
            frame.panel.as_ref().unwrap().payload,
            fixtures::current_conditions("Sunny")
        );
        assert_eq!(frame.ticker_generation, 1);
        assert!(frame.ticker_text.starts_with("Flood Watch"));
    }

    #[test]
    fn test_frame_reports_staleness_as_data_ages() {
        let cache = cache();
        let t0 = Instant::now();
        let fetched = Utc::now();
        cache
            .put(
                FeedCategory::CurrentConditions,
                fixtures::current_conditions("Sunny"),
                fetched,
            )
            .unwrap();
        let mut context = DisplayContext::new(Arc::clone(&cache), rotation(), ticker(), t0);

        // current_conditions: aging after 15 min, stale after 30 min
        let frame = context.render_tick(t0, fetched + chrono::Duration::minutes(20));
        assert_eq!(frame.panel_staleness, PanelStaleness::Aging);
        let frame = context.render_tick(t0, fetched + chrono::Duration::hours(2));
        assert_eq!(frame.panel_staleness, PanelStaleness::Stale);
        assert!(frame.panel.is_some());
    }

    #[test]
    fn test_rotation_advances_with_clock() {
        let t0 = Instant::now();
        let mut context = DisplayContext::new(cache(), rotation(), ticker(), t0);
        context.render_tick(t0, Utc::now());
        let frame = context.render_tick(t0 + Duration::from_secs(10), Utc::now());
        assert_eq!(frame.active_panel, Panel::Radar);
        assert_eq!(frame.panel_staleness, PanelStaleness::Absent);
    }

    #[test]
    fn test_skip_policy_uses_cache_presence() {
        let cache = cache();
        cache
            .put(FeedCategory::TextForecast, fixtures::payload_for(FeedCategory::TextForecast), Utc::now())
            .unwrap();
        let t0 = Instant::now();
        let rotation = RotationConfig {
            missing_panel: MissingPanelPolicy::Skip,
            ..rotation()
        };
        let mut context = DisplayContext::new(cache, rotation, ticker(), t0);

        let frame = context.render_tick(t0, Utc::now());
        assert_eq!(frame.active_panel, Panel::TextForecast);
        assert_eq!(frame.panel_staleness, PanelStaleness::Fresh);
    }

    #[test]
    fn test_ticker_scrolls_between_frames() {
        let cache = cache();
        cache
            .put(
                FeedCategory::Headlines,
                fixtures::headlines(&[("h1", "0123456789")]),
                Utc::now(),
            )
            .unwrap();
        let t0 = Instant::now();
        let mut context = DisplayContext::new(cache, rotation(), ticker(), t0);

        let first = context.render_tick(t0, Utc::now());
        let second = context.render_tick(t0 + Duration::from_millis(500), Utc::now());
        assert!(first.ticker_text.starts_with("0123"));
        assert!(second.ticker_text.starts_with("2345"));
        assert_eq!(first.ticker_generation, second.ticker_generation);
    }
}
