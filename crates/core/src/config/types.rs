use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use crate::cache::StalenessThresholds;
use crate::feed::FeedCategory;
use crate::orchestrator::DisplayConfig;
use crate::rotator::RotationConfig;
use crate::scheduler::RetryPolicy;
use crate::ticker::TickerConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub headlines: HeadlinesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// The single station this display reports on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationConfig {
    #[serde(default = "default_station_name")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Sent with every upstream request; api.weather.gov asks for contact info.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_nws_base_url")]
    pub nws_base_url: String,
    #[serde(default = "default_radar_url")]
    pub radar_url: String,
    /// Stations listed on the latest-observations panel.
    #[serde(default = "default_station_limit")]
    pub station_limit: usize,
    /// Nearest stations sampled for the regional map's city readings.
    #[serde(default = "default_regional_station_limit")]
    pub regional_station_limit: usize,
}

fn default_station_name() -> String {
    "Weatharr Station".to_string()
}

fn default_user_agent() -> String {
    "Weatharr/0.1 (+contact)".to_string()
}

fn default_nws_base_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_radar_url() -> String {
    "https://radar.weather.gov/ridge/standard/CONUS_Composite_Reflectivity.png".to_string()
}

fn default_station_limit() -> usize {
    6
}

fn default_regional_station_limit() -> usize {
    40
}

/// RSS/Atom headline feeds for the ticker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeadlinesConfig {
    #[serde(default)]
    pub rss_urls: Vec<String>,
    #[serde(default = "default_max_items")]
    pub max_items_per_feed: usize,
}

impl Default for HeadlinesConfig {
    fn default() -> Self {
        Self {
            rss_urls: Vec::new(),
            max_items_per_feed: default_max_items(),
        }
    }
}

fn default_max_items() -> usize {
    10
}

/// Resolved refresh and freshness settings for one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedSettings {
    pub refresh_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub aging_after_secs: u64,
    pub stale_after_secs: u64,
}

impl FeedSettings {
    const fn new(refresh: u64, timeout: u64, aging: u64, stale: u64) -> Self {
        Self {
            refresh_interval_secs: refresh,
            fetch_timeout_secs: timeout,
            aging_after_secs: aging,
            stale_after_secs: stale,
        }
    }

    /// Built-in settings; radar goes stale fastest, the 7-day forecast slowest.
    pub fn default_for(category: FeedCategory) -> Self {
        match category {
            FeedCategory::CurrentConditions => Self::new(300, 15, 900, 1800),
            FeedCategory::Radar => Self::new(120, 15, 300, 600),
            FeedCategory::HourlyCurve => Self::new(900, 15, 3600, 7200),
            FeedCategory::Forecast7Day => Self::new(1800, 15, 7200, 21600),
            FeedCategory::RegionalMap => Self::new(600, 30, 1800, 3600),
            FeedCategory::TextForecast => Self::new(1800, 15, 7200, 21600),
            FeedCategory::LatestObservations => Self::new(300, 30, 900, 1800),
            FeedCategory::Alerts => Self::new(60, 15, 300, 900),
            FeedCategory::Headlines => Self::new(300, 10, 1800, 3600),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn thresholds(&self) -> StalenessThresholds {
        StalenessThresholds::new(
            Duration::from_secs(self.aging_after_secs),
            Duration::from_secs(self.stale_after_secs),
        )
    }
}

/// Partial override of a feed's built-in settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aging_after_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_after_secs: Option<u64>,
}

/// `[feeds.<category>]` tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_conditions: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_curve: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_7day: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regional_map: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_forecast: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_observations: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<FeedOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headlines: Option<FeedOverride>,
}

impl FeedsConfig {
    fn override_for(&self, category: FeedCategory) -> Option<&FeedOverride> {
        match category {
            FeedCategory::CurrentConditions => self.current_conditions.as_ref(),
            FeedCategory::Radar => self.radar.as_ref(),
            FeedCategory::HourlyCurve => self.hourly_curve.as_ref(),
            FeedCategory::Forecast7Day => self.forecast_7day.as_ref(),
            FeedCategory::RegionalMap => self.regional_map.as_ref(),
            FeedCategory::TextForecast => self.text_forecast.as_ref(),
            FeedCategory::LatestObservations => self.latest_observations.as_ref(),
            FeedCategory::Alerts => self.alerts.as_ref(),
            FeedCategory::Headlines => self.headlines.as_ref(),
        }
    }

    /// Built-in settings for `category` with any configured overrides applied.
    pub fn settings(&self, category: FeedCategory) -> FeedSettings {
        let defaults = FeedSettings::default_for(category);
        let Some(o) = self.override_for(category) else {
            return defaults;
        };
        FeedSettings {
            refresh_interval_secs: o
                .refresh_interval_secs
                .unwrap_or(defaults.refresh_interval_secs),
            fetch_timeout_secs: o.fetch_timeout_secs.unwrap_or(defaults.fetch_timeout_secs),
            aging_after_secs: o.aging_after_secs.unwrap_or(defaults.aging_after_secs),
            stale_after_secs: o.stale_after_secs.unwrap_or(defaults.stale_after_secs),
        }
    }
}

/// Sanitized config for API responses (feed URLs redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub station: SanitizedStationConfig,
    pub server: ServerConfig,
    pub feeds: Vec<SanitizedFeedConfig>,
    pub retry: RetryPolicy,
    pub rotation: RotationConfig,
    pub ticker: TickerConfig,
    pub display: DisplayConfig,
    pub headline_feeds_configured: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedFeedConfig {
    pub category: FeedCategory,
    #[serde(flatten)]
    pub settings: FeedSettings,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            station: SanitizedStationConfig {
                name: config.station.name.clone(),
                latitude: config.station.latitude,
                longitude: config.station.longitude,
            },
            server: config.server.clone(),
            feeds: FeedCategory::ALL
                .into_iter()
                .map(|category| SanitizedFeedConfig {
                    category,
                    settings: config.feeds.settings(category),
                })
                .collect(),
            retry: config.retry.clone(),
            rotation: config.rotation.clone(),
            ticker: config.ticker.clone(),
            display: config.display.clone(),
            headline_feeds_configured: config.headlines.rss_urls.len(),
        }
    }
}
