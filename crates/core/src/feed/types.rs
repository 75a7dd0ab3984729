//! Types shared by every feed: categories, payloads and ticker entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One upstream data category.
///
/// The set is fixed: seven categories back a display panel, the remaining two
/// (alerts and headlines) feed the ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedCategory {
    CurrentConditions,
    Radar,
    HourlyCurve,
    #[serde(rename = "forecast_7day")]
    Forecast7Day,
    RegionalMap,
    TextForecast,
    LatestObservations,
    Alerts,
    Headlines,
}

impl FeedCategory {
    /// Every category, in display order followed by the ticker feeds.
    pub const ALL: [FeedCategory; 9] = [
        FeedCategory::CurrentConditions,
        FeedCategory::Radar,
        FeedCategory::HourlyCurve,
        FeedCategory::Forecast7Day,
        FeedCategory::RegionalMap,
        FeedCategory::TextForecast,
        FeedCategory::LatestObservations,
        FeedCategory::Alerts,
        FeedCategory::Headlines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedCategory::CurrentConditions => "current_conditions",
            FeedCategory::Radar => "radar",
            FeedCategory::HourlyCurve => "hourly_curve",
            FeedCategory::Forecast7Day => "forecast_7day",
            FeedCategory::RegionalMap => "regional_map",
            FeedCategory::TextForecast => "text_forecast",
            FeedCategory::LatestObservations => "latest_observations",
            FeedCategory::Alerts => "alerts",
            FeedCategory::Headlines => "headlines",
        }
    }

    /// Whether this category feeds the ticker rather than a panel.
    pub fn is_ticker_feed(&self) -> bool {
        matches!(self, FeedCategory::Alerts | FeedCategory::Headlines)
    }
}

impl fmt::Display for FeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age classification of a cached snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Staleness {
    Fresh,
    Aging,
    Stale,
}

impl Staleness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Staleness::Fresh => "fresh",
            Staleness::Aging => "aging",
            Staleness::Stale => "stale",
        }
    }
}

/// An active weather alert shown in the ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEntry {
    /// Upstream identifier; identity for change detection.
    pub id: String,
    /// Text shown in the ticker (the alert headline).
    pub text: String,
    /// When the upstream issued the alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_timestamp: Option<DateTime<Utc>>,
}

/// A news headline shown in the ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineEntry {
    /// Stable identifier derived from the item link or title.
    pub id: String,
    /// Headline title.
    pub text: String,
    /// Publication time, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_timestamp: Option<DateTime<Utc>>,
}

/// Conditions at the primary observation station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub station: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_f: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_mph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<String>,
    /// Observation text such as "Partly Cloudy".
    pub description: String,
    /// Short forecast for the current period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Radar composite image.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarImage {
    pub source_url: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl fmt::Debug for RadarImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadarImage")
            .field("source_url", &self.source_url)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// One point of the hourly temperature curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    pub temperature_f: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip_chance_pct: Option<f64>,
    /// Gridpoint sky cover for the hour, when the grid layer was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover_pct: Option<f64>,
    pub short_forecast: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyCurve {
    pub points: Vec<HourlyPoint>,
}

/// A forecast day with its daytime high and overnight low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPeriod {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_f: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_f: Option<f64>,
    pub short_forecast: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub days: Vec<DailyPeriod>,
}

/// Latest reading of one observation station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub station_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_f: Option<f64>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalMap {
    pub readings: Vec<StationReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastText {
    pub name: String,
    pub detailed_forecast: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextForecast {
    pub periods: Vec<ForecastText>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestObservations {
    pub rows: Vec<StationReading>,
}

/// Typed payload returned by a feed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum FeedPayload {
    CurrentConditions(CurrentConditions),
    Radar(RadarImage),
    HourlyCurve(HourlyCurve),
    #[serde(rename = "forecast_7day")]
    Forecast7Day(DailyForecast),
    RegionalMap(RegionalMap),
    TextForecast(TextForecast),
    LatestObservations(LatestObservations),
    Alerts(Vec<AlertEntry>),
    Headlines(Vec<HeadlineEntry>),
}

impl FeedPayload {
    /// The category this payload belongs to.
    pub fn category(&self) -> FeedCategory {
        match self {
            FeedPayload::CurrentConditions(_) => FeedCategory::CurrentConditions,
            FeedPayload::Radar(_) => FeedCategory::Radar,
            FeedPayload::HourlyCurve(_) => FeedCategory::HourlyCurve,
            FeedPayload::Forecast7Day(_) => FeedCategory::Forecast7Day,
            FeedPayload::RegionalMap(_) => FeedCategory::RegionalMap,
            FeedPayload::TextForecast(_) => FeedCategory::TextForecast,
            FeedPayload::LatestObservations(_) => FeedCategory::LatestObservations,
            FeedPayload::Alerts(_) => FeedCategory::Alerts,
            FeedPayload::Headlines(_) => FeedCategory::Headlines,
        }
    }

    pub fn alerts(&self) -> Option<&[AlertEntry]> {
        match self {
            FeedPayload::Alerts(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn headlines(&self) -> Option<&[HeadlineEntry]> {
        match self {
            FeedPayload::Headlines(entries) => Some(entries),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_names_match_as_str() {
        for category in FeedCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            let parsed: FeedCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_ticker_feeds() {
        let ticker: Vec<_> = FeedCategory::ALL
            .iter()
            .filter(|c| c.is_ticker_feed())
            .collect();
        assert_eq!(ticker, vec![&FeedCategory::Alerts, &FeedCategory::Headlines]);
    }

    #[test]
    fn test_payload_category() {
        let payload = FeedPayload::Alerts(vec![]);
        assert_eq!(payload.category(), FeedCategory::Alerts);
        assert!(payload.alerts().is_some());
        assert!(payload.headlines().is_none());

        let payload = FeedPayload::HourlyCurve(HourlyCurve::default());
        assert_eq!(payload.category(), FeedCategory::HourlyCurve);
    }

    #[test]
    fn test_radar_bytes_not_serialized() {
        let payload = FeedPayload::Radar(RadarImage {
            source_url: "https://radar.example/composite.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "radar");
        assert!(json["data"].get("bytes").is_none());
        assert_eq!(json["data"]["content_type"], "image/png");
    }
}
