//! Ticker compositor.
//!
//! Builds the line `alerts ++ headlines ++ alerts` from the cache and scrolls
//! through it. The stream ends with a separator, so wrapping from the end back
//! to the start reads like any other entry boundary.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::debug;

use crate::cache::FeedCache;
use crate::feed::{AlertEntry, FeedCategory, HeadlineEntry};
use crate::metrics;

use super::config::TickerConfig;
use super::types::{
    TickerBlock, TickerCursor, TickerEntry, TickerPhase, TickerSegment, TickerStream,
};

/// Compose the ticker stream. Returns an empty stream when there is nothing to
/// show.
pub fn compose_stream(
    alerts: &[TickerEntry],
    headlines: &[TickerEntry],
    separator: &str,
) -> TickerStream {
    let mut segments = Vec::with_capacity(3);
    if !alerts.is_empty() {
        segments.push(TickerSegment {
            block: TickerBlock::AlertsFirst,
            entries: alerts.to_vec(),
        });
    }
    if !headlines.is_empty() {
        segments.push(TickerSegment {
            block: TickerBlock::Headlines,
            entries: headlines.to_vec(),
        });
    }
    if !alerts.is_empty() {
        segments.push(TickerSegment {
            block: TickerBlock::AlertsSecond,
            entries: alerts.to_vec(),
        });
    }

    let mut chars = Vec::new();
    for entry in segments.iter().flat_map(|s| &s.entries) {
        chars.extend(entry.text.chars());
        chars.extend(separator.chars());
    }

    TickerStream { segments, chars }
}

/// Advance a cursor by `rate * dt` characters, wrapping at `len`.
pub fn advance(cursor: TickerCursor, dt: Duration, rate: f64, len: usize) -> TickerCursor {
    if len == 0 {
        return TickerCursor {
            position: 0.0,
            ..cursor
        };
    }
    let step = rate * dt.as_secs_f64();
    let position = if step.is_finite() {
        (cursor.position + step).rem_euclid(len as f64)
    } else {
        cursor.position.rem_euclid(len as f64)
    };
    TickerCursor { position, ..cursor }
}

/// Carry a position over to a stream of a different length, keeping the same
/// relative offset.
pub fn remap(position: f64, old_len: usize, new_len: usize) -> f64 {
    if old_len == 0 || new_len == 0 {
        return 0.0;
    }
    (position / old_len as f64 * new_len as f64).rem_euclid(new_len as f64)
}

/// Identity of the ticker contents: alert ids and headline ids.
type EntryKey = (BTreeSet<String>, BTreeSet<String>);

fn entry_key(alerts: &[TickerEntry], headlines: &[TickerEntry]) -> EntryKey {
    (
        alerts.iter().map(|e| e.id.clone()).collect(),
        headlines.iter().map(|e| e.id.clone()).collect(),
    )
}

fn to_entries<'a, T>(items: impl IntoIterator<Item = &'a T>) -> Vec<TickerEntry>
where
    T: 'a,
    TickerEntry: From<&'a T>,
{
    items
        .into_iter()
        .map(TickerEntry::from)
        .filter(|e| !e.text.trim().is_empty())
        .collect()
}

/// Scrolling ticker state.
pub struct TickerCompositor {
    config: TickerConfig,
    stream: TickerStream,
    key: EntryKey,
    cursor: TickerCursor,
    phase: TickerPhase,
}

impl TickerCompositor {
    /// Starts idle, waiting for the first alerts or headlines.
    pub fn new(config: TickerConfig) -> Self {
        Self {
            config,
            stream: TickerStream::default(),
            key: EntryKey::default(),
            cursor: TickerCursor::default(),
            phase: TickerPhase::Composing,
        }
    }

    /// Note that alerts or headlines changed; the next tick recomposes.
    pub fn mark_changed(&mut self) {
        self.phase = TickerPhase::Composing;
    }

    /// Recompose from entry lists. Returns `true` when the entry set changed
    /// and the generation was bumped. Entries edited under the same ids
    /// replace the text in place, keeping the generation.
    pub fn rebuild(&mut self, alerts: &[AlertEntry], headlines: &[HeadlineEntry]) -> bool {
        self.phase = TickerPhase::Scrolling;

        let alerts = to_entries(alerts);
        let headlines = to_entries(headlines);
        let key = entry_key(&alerts, &headlines);
        let stream = compose_stream(&alerts, &headlines, &self.config.separator);
        let position = remap(self.cursor.position, self.stream.len(), stream.len());

        if key == self.key {
            if stream != self.stream {
                self.stream = stream;
                self.cursor.position = position;
                debug!(
                    generation = self.cursor.generation,
                    chars = self.stream.len(),
                    "Ticker text updated"
                );
            }
            return false;
        }

        self.key = key;
        self.stream = stream;
        self.cursor = TickerCursor {
            position,
            generation: self.cursor.generation + 1,
        };
        metrics::TICKER_REBUILDS.inc();
        metrics::TICKER_GENERATION.set(self.cursor.generation as i64);

        debug!(
            generation = self.cursor.generation,
            alerts = alerts.len(),
            headlines = headlines.len(),
            chars = self.stream.len(),
            "Ticker recomposed"
        );
        true
    }

    /// Recompose from the cache's current alerts and headlines. A category
    /// that was never fetched counts as empty.
    pub fn refresh_from_cache(&mut self, cache: &FeedCache) -> bool {
        let alerts = cache.get(FeedCategory::Alerts);
        let headlines = cache.get(FeedCategory::Headlines);

        let alerts = alerts
            .as_ref()
            .and_then(|s| s.payload.alerts())
            .unwrap_or_default();
        let headlines = headlines
            .as_ref()
            .and_then(|s| s.payload.headlines())
            .unwrap_or_default();

        self.rebuild(alerts, headlines)
    }

    /// One tick: recompose if a change is pending, then scroll by `dt`.
    pub fn tick(&mut self, dt: Duration, cache: &FeedCache) {
        if self.phase == TickerPhase::Composing {
            self.refresh_from_cache(cache);
        }
        self.cursor = advance(self.cursor, dt, self.config.scroll_rate, self.stream.len());
    }

    /// What the ticker line shows right now. The idle message is returned
    /// verbatim when there is nothing to scroll.
    pub fn visible_text(&self) -> String {
        if self.stream.is_empty() {
            return self.config.idle_message.clone();
        }
        let start = self.cursor.position.floor() as usize;
        self.stream.window(start, self.config.visible_width)
    }

    /// The full composed line, or the idle message.
    pub fn stream_text(&self) -> String {
        if self.stream.is_empty() {
            return self.config.idle_message.clone();
        }
        self.stream.text()
    }

    pub fn segments(&self) -> &[TickerSegment] {
        self.stream.segments()
    }

    pub fn cursor(&self) -> TickerCursor {
        self.cursor
    }

    pub fn phase(&self) -> TickerPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.cursor.generation
    }

    pub fn is_idle(&self) -> bool {
        self.stream.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedsConfig;
    use crate::testing::fixtures;
    use chrono::Utc;

    fn entry(id: &str, text: &str) -> TickerEntry {
        TickerEntry {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    fn alert(id: &str, text: &str) -> AlertEntry {
        AlertEntry {
            id: id.to_string(),
            text: text.to_string(),
            source_timestamp: None,
        }
    }

    fn headline(id: &str, text: &str) -> HeadlineEntry {
        HeadlineEntry {
            id: id.to_string(),
            text: text.to_string(),
            source_timestamp: None,
        }
    }

    fn config() -> TickerConfig {
        TickerConfig {
            scroll_rate: 10.0,
            separator: " | ".to_string(),
            idle_message: "No news".to_string(),
            visible_width: 12,
        }
    }

    #[test]
    fn test_compose_alerts_wrap_headlines() {
        let stream = compose_stream(
            &[entry("a1", "A1"), entry("a2", "A2")],
            &[entry("h1", "H1")],
            " | ",
        );
        assert_eq!(stream.text(), "A1 | A2 | H1 | A1 | A2 | ");
        let blocks: Vec<_> = stream.segments().iter().map(|s| s.block).collect();
        assert_eq!(
            blocks,
            vec![
                TickerBlock::AlertsFirst,
                TickerBlock::Headlines,
                TickerBlock::AlertsSecond
            ]
        );
    }

    #[test]
    fn test_compose_without_headlines_repeats_alerts() {
        let stream = compose_stream(&[entry("a1", "A1")], &[], " | ");
        assert_eq!(stream.text(), "A1 | A1 | ");
    }

    #[test]
    fn test_compose_without_alerts_is_headlines_only() {
        let stream = compose_stream(&[], &[entry("h1", "H1"), entry("h2", "H2")], " | ");
        assert_eq!(stream.text(), "H1 | H2 | ");
        assert_eq!(stream.segments().len(), 1);
    }

    #[test]
    fn test_compose_empty_is_idle() {
        let stream = compose_stream(&[], &[], " | ");
        assert!(stream.is_empty());
        assert!(stream.segments().is_empty());
    }

    #[test]
    fn test_advance_wraps() {
        let cursor = TickerCursor {
            position: 8.0,
            generation: 3,
        };
        let next = advance(cursor, Duration::from_millis(500), 10.0, 10);
        assert!((next.position - 3.0).abs() < 1e-9);
        assert_eq!(next.generation, 3);

        let idle = advance(cursor, Duration::from_secs(1), 10.0, 0);
        assert_eq!(idle.position, 0.0);
    }

    #[test]
    fn test_advance_accumulates_fractional_steps() {
        let mut cursor = TickerCursor::default();
        for _ in 0..10 {
            cursor = advance(cursor, Duration::from_millis(10), 10.0, 100);
        }
        assert!((cursor.position - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_remap_is_proportional() {
        assert!((remap(50.0, 100, 120) - 60.0).abs() < 1e-9);
        assert!((remap(5.0, 10, 20) - 10.0).abs() < 1e-9);
        assert!((remap(15.0, 20, 10) - 7.5).abs() < 1e-9);
        assert_eq!(remap(3.0, 0, 10), 0.0);
        assert_eq!(remap(3.0, 10, 0), 0.0);
    }

    #[test]
    fn test_starts_idle_with_message() {
        let compositor = TickerCompositor::new(config());
        assert!(compositor.is_idle());
        assert_eq!(compositor.visible_text(), "No news");
        assert_eq!(compositor.generation(), 0);
        assert_eq!(compositor.phase(), TickerPhase::Composing);
    }

    #[test]
    fn test_rebuild_bumps_generation_only_on_id_change() {
        let mut compositor = TickerCompositor::new(config());

        assert!(compositor.rebuild(&[alert("a1", "Flood Watch")], &[]));
        assert_eq!(compositor.generation(), 1);
        assert_eq!(compositor.phase(), TickerPhase::Scrolling);

        // Same ids, different text: text replaced, generation kept.
        assert!(!compositor.rebuild(&[alert("a1", "Flood Watch (updated)")], &[]));
        assert_eq!(compositor.generation(), 1);
        assert_eq!(
            compositor.stream_text(),
            "Flood Watch (updated) | Flood Watch (updated) | "
        );

        assert!(compositor.rebuild(
            &[alert("a1", "Flood Watch")],
            &[headline("h1", "Storm nears coast")]
        ));
        assert_eq!(compositor.generation(), 2);
        assert_eq!(
            compositor.stream_text(),
            "Flood Watch | Storm nears coast | Flood Watch | "
        );
    }

    #[test]
    fn test_edited_text_keeps_relative_position() {
        let mut compositor = TickerCompositor::new(config());
        compositor.rebuild(&[alert("a1", "Flood Watch")], &[]);
        // Halfway through the 28-char line.
        compositor.cursor.position = 14.0;

        assert!(!compositor.rebuild(&[alert("a1", "Flood Watch (updated)")], &[]));
        let cursor = compositor.cursor();
        assert_eq!(cursor.generation, 1);
        // Halfway through the 48-char line.
        assert!((cursor.position - 24.0).abs() < 1e-9);

        // Identical input leaves everything alone.
        assert!(!compositor.rebuild(&[alert("a1", "Flood Watch (updated)")], &[]));
        assert!((compositor.cursor().position - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_back_to_idle_when_entries_clear() {
        let mut compositor = TickerCompositor::new(config());
        compositor.rebuild(&[], &[headline("h1", "Story")]);
        assert!(!compositor.is_idle());

        assert!(compositor.rebuild(&[], &[]));
        assert!(compositor.is_idle());
        assert_eq!(compositor.visible_text(), "No news");
        assert_eq!(compositor.cursor().position, 0.0);
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let mut compositor = TickerCompositor::new(config());
        compositor.rebuild(&[alert("a1", "   ")], &[headline("h1", "Story")]);
        assert_eq!(compositor.stream_text(), "Story | ");
    }

    #[test]
    fn test_visible_window_scrolls_and_wraps() {
        let cache = FeedCache::from_config(&FeedsConfig::default());
        cache
            .put(
                FeedCategory::Headlines,
                fixtures::headlines(&[("h1", "ABCDEFGH")]),
                Utc::now(),
            )
            .unwrap();

        let mut compositor = TickerCompositor::new(TickerConfig {
            scroll_rate: 2.0,
            visible_width: 4,
            ..config()
        });
        // Stream: "ABCDEFGH | " (11 chars)
        compositor.tick(Duration::ZERO, &cache);
        assert_eq!(compositor.visible_text(), "ABCD");

        compositor.tick(Duration::from_secs(1), &cache);
        assert_eq!(compositor.visible_text(), "CDEF");

        compositor.tick(Duration::from_secs(4), &cache);
        // position 10 -> " ABC" (last space of separator, then wrap)
        assert_eq!(compositor.visible_text(), " ABC");
    }

    #[test]
    fn test_position_survives_generation_bump() {
        let mut compositor = TickerCompositor::new(config());
        compositor.rebuild(&[], &[headline("h1", "0123456789")]);
        // "0123456789 | " is 13 chars
        compositor.cursor = TickerCursor {
            position: 6.5,
            generation: compositor.generation(),
        };

        compositor.rebuild(&[], &[headline("h1", "0123456789"), headline("h2", "0123456789")]);
        // 26 chars now, offset carried proportionally
        assert!((compositor.cursor().position - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_tick_only_recomposes_when_marked() {
        let cache = FeedCache::from_config(&FeedsConfig::default());
        let mut compositor = TickerCompositor::new(config());
        compositor.tick(Duration::from_millis(100), &cache);
        assert!(compositor.is_idle());

        cache
            .put(
                FeedCategory::Alerts,
                fixtures::alerts(&[("a1", "Heat Advisory")]),
                Utc::now(),
            )
            .unwrap();

        compositor.tick(Duration::from_millis(100), &cache);
        assert!(compositor.is_idle());

        compositor.mark_changed();
        compositor.tick(Duration::from_millis(100), &cache);
        assert!(!compositor.is_idle());
        assert_eq!(compositor.generation(), 1);
    }
}
