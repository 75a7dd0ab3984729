//! Panel rotation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::Panel;

/// What the rotator does with a panel whose category was never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPanelPolicy {
    /// Show the panel for its normal dwell, marked absent.
    #[default]
    Placeholder,
    /// Move straight past it.
    Skip,
}

/// Per-panel dwell overrides in seconds; unset panels use the default dwell.
/// Fractional seconds are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelDwellOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_conditions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_curve: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_7day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_map: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_forecast: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_observations: Option<f64>,
}

impl PanelDwellOverrides {
    pub fn get(&self, panel: Panel) -> Option<f64> {
        match panel {
            Panel::CurrentConditions => self.current_conditions,
            Panel::Radar => self.radar,
            Panel::HourlyCurve => self.hourly_curve,
            Panel::Forecast7Day => self.forecast_7day,
            Panel::RegionalMap => self.regional_map,
            Panel::TextForecast => self.text_forecast,
            Panel::LatestObservations => self.latest_observations,
        }
    }
}

/// Configuration for the panel rotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Dwell for panels without an override (seconds).
    #[serde(default = "default_dwell")]
    pub default_dwell_secs: f64,

    #[serde(default)]
    pub dwell_secs: PanelDwellOverrides,

    #[serde(default)]
    pub missing_panel: MissingPanelPolicy,
}

fn default_dwell() -> f64 {
    12.0
}

/// Shortest dwell the rotator will honour.
pub const MIN_DWELL: Duration = Duration::from_millis(100);

/// Longest dwell the rotator will honour.
pub const MAX_DWELL: Duration = Duration::from_secs(3600);

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            default_dwell_secs: default_dwell(),
            dwell_secs: PanelDwellOverrides::default(),
            missing_panel: MissingPanelPolicy::default(),
        }
    }
}

impl RotationConfig {
    /// Configured dwell for a panel in seconds, before any clamping.
    pub fn dwell_secs_for(&self, panel: Panel) -> f64 {
        self.dwell_secs.get(panel).unwrap_or(self.default_dwell_secs)
    }

    /// Dwell for a panel, clamped to [`MIN_DWELL`]..=[`MAX_DWELL`].
    pub fn dwell_for(&self, panel: Panel) -> Duration {
        let secs = self.dwell_secs_for(panel);
        if !secs.is_finite() || secs <= MIN_DWELL.as_secs_f64() {
            return MIN_DWELL;
        }
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_DWELL)
            .min(MAX_DWELL)
    }
}
