//! Display orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing of the render loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// How often a snapshot is handed to the display sink (milliseconds).
    /// Also the granularity of panel dwell times and ticker scrolling.
    #[serde(default = "default_render_interval")]
    pub render_interval_ms: u64,

    /// How long `stop()` waits for loops and in-flight fetches to wind down
    /// before aborting them (milliseconds).
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_ms: u64,
}

fn default_render_interval() -> u64 {
    100 // 10 frames per second
}

fn default_shutdown_grace() -> u64 {
    2000
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_interval_ms: default_render_interval(),
            shutdown_grace_ms: default_shutdown_grace(),
        }
    }
}

impl DisplayConfig {
    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms.max(1))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.render_interval_ms, 100);
        assert_eq!(config.shutdown_grace_ms, 2000);
        assert_eq!(config.render_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            render_interval_ms = 40
        "#;
        let config: DisplayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.render_interval_ms, 40);
        assert_eq!(config.shutdown_grace_ms, 2000);
    }
}
