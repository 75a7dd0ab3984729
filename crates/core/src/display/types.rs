//! What the display receives each render tick.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::cache::{FeedSnapshot, SnapshotView};
use crate::feed::Staleness;
use crate::rotator::Panel;

/// Freshness of the data behind the active panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStaleness {
    Fresh,
    Aging,
    Stale,
    /// No data was ever fetched for this panel.
    Absent,
}

impl From<Staleness> for PanelStaleness {
    fn from(staleness: Staleness) -> Self {
        match staleness {
            Staleness::Fresh => PanelStaleness::Fresh,
            Staleness::Aging => PanelStaleness::Aging,
            Staleness::Stale => PanelStaleness::Stale,
        }
    }
}

impl From<&SnapshotView> for PanelStaleness {
    fn from(view: &SnapshotView) -> Self {
        match view.staleness() {
            Some(staleness) => staleness.into(),
            None => PanelStaleness::Absent,
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySnapshot {
    pub active_panel: Panel,
    /// Data for the active panel; `None` when absent.
    pub panel: Option<Arc<FeedSnapshot>>,
    pub panel_staleness: PanelStaleness,
    /// Never empty: the idle message stands in when there is nothing to scroll.
    pub ticker_text: String,
    pub ticker_generation: u64,
    pub rendered_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display unavailable: {0}")]
    Unavailable(String),

    #[error("render failed: {0}")]
    Render(String),
}
