//! Panel tags and rotation state.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::feed::FeedCategory;

/// One full-screen display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    CurrentConditions,
    Radar,
    HourlyCurve,
    #[serde(rename = "forecast_7day")]
    Forecast7Day,
    RegionalMap,
    TextForecast,
    LatestObservations,
}

impl Panel {
    /// Fixed display order; rotation wraps from the last back to the first.
    pub const ORDER: [Panel; 7] = [
        Panel::CurrentConditions,
        Panel::Radar,
        Panel::HourlyCurve,
        Panel::Forecast7Day,
        Panel::RegionalMap,
        Panel::TextForecast,
        Panel::LatestObservations,
    ];

    /// Position in [`Panel::ORDER`].
    pub fn index(&self) -> usize {
        match self {
            Panel::CurrentConditions => 0,
            Panel::Radar => 1,
            Panel::HourlyCurve => 2,
            Panel::Forecast7Day => 3,
            Panel::RegionalMap => 4,
            Panel::TextForecast => 5,
            Panel::LatestObservations => 6,
        }
    }

    /// The panel that follows this one.
    pub fn next(&self) -> Panel {
        Panel::ORDER[(self.index() + 1) % Panel::ORDER.len()]
    }

    /// The feed category this panel renders.
    pub fn category(&self) -> FeedCategory {
        match self {
            Panel::CurrentConditions => FeedCategory::CurrentConditions,
            Panel::Radar => FeedCategory::Radar,
            Panel::HourlyCurve => FeedCategory::HourlyCurve,
            Panel::Forecast7Day => FeedCategory::Forecast7Day,
            Panel::RegionalMap => FeedCategory::RegionalMap,
            Panel::TextForecast => FeedCategory::TextForecast,
            Panel::LatestObservations => FeedCategory::LatestObservations,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.category().as_str()
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<FeedCategory> for Panel {
    type Error = FeedCategory;

    fn try_from(category: FeedCategory) -> Result<Self, Self::Error> {
        Panel::ORDER
            .into_iter()
            .find(|panel| panel.category() == category)
            .ok_or(category)
    }
}

/// The active panel and when it became active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    pub active_panel: Panel,
    pub entered_at: Instant,
}
