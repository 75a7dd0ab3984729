//! Panel rotation state machine.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::metrics;

use super::config::{MissingPanelPolicy, RotationConfig};
use super::types::{Panel, PanelState};

/// Cycles through the panels in fixed order, one dwell at a time.
///
/// The rotator never looks at freshness; it only needs to know whether a
/// panel has any data at all, and only when the missing-panel policy is
/// [`MissingPanelPolicy::Skip`].
pub struct PanelRotator {
    config: RotationConfig,
    state: PanelState,
}

impl PanelRotator {
    /// Start on the first panel in display order.
    pub fn new(config: RotationConfig, now: Instant) -> Self {
        Self {
            config,
            state: PanelState {
                active_panel: Panel::ORDER[0],
                entered_at: now,
            },
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn active_panel(&self) -> Panel {
        self.state.active_panel
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Time left before the active panel's dwell expires.
    pub fn dwell_remaining(&self, now: Instant) -> Duration {
        self.config
            .dwell_for(self.state.active_panel)
            .saturating_sub(now.saturating_duration_since(self.state.entered_at))
    }

    /// Advance the rotation. Returns the newly entered panel when a
    /// transition happened. At most one transition per call.
    pub fn tick(&mut self, now: Instant, is_available: impl Fn(Panel) -> bool) -> Option<Panel> {
        let active = self.state.active_panel;

        // With nothing available at all, skipping would spin; rotate as if
        // every panel were a placeholder instead.
        let skipping = self.config.missing_panel == MissingPanelPolicy::Skip
            && Panel::ORDER.iter().any(|&p| is_available(p));

        let target = if skipping && !is_available(active) {
            Self::next_available(active, &is_available)
        } else if self.dwell_remaining(now).is_zero() {
            if skipping {
                Self::next_available(active, &is_available)
            } else {
                active.next()
            }
        } else {
            return None;
        };

        self.state.entered_at = now;
        if target == active {
            // Sole available panel under skip: start a fresh dwell in place.
            return None;
        }

        self.state.active_panel = target;
        metrics::PANEL_TRANSITIONS
            .with_label_values(&[target.as_str()])
            .inc();
        debug!(from = %active, to = %target, "Panel transition");
        Some(target)
    }

    /// First available panel after `from`, wrapping; `from` itself if it is
    /// the only one.
    fn next_available(from: Panel, is_available: &impl Fn(Panel) -> bool) -> Panel {
        let mut panel = from.next();
        for _ in 0..Panel::ORDER.len() {
            if is_available(panel) {
                return panel;
            }
            panel = panel.next();
        }
        from.next()
    }
}
