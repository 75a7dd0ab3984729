//! Ticker configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the scrolling ticker line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Scroll speed in characters per second.
    #[serde(default = "default_scroll_rate")]
    pub scroll_rate: f64,

    /// Placed between entries and at the wrap point.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Shown, without scrolling, when there are no alerts and no headlines.
    #[serde(default = "default_idle_message")]
    pub idle_message: String,

    /// Number of characters visible at once.
    #[serde(default = "default_visible_width")]
    pub visible_width: usize,
}

fn default_scroll_rate() -> f64 {
    8.0
}

fn default_separator() -> String {
    "  \u{2022}  ".to_string()
}

fn default_idle_message() -> String {
    "Weather data loading...".to_string()
}

fn default_visible_width() -> usize {
    80
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            scroll_rate: default_scroll_rate(),
            separator: default_separator(),
            idle_message: default_idle_message(),
            visible_width: default_visible_width(),
        }
    }
}
