//! Testing utilities and mock implementations.
//!
//! This module provides a scriptable feed source, a recording display sink
//! and payload fixtures, so the scheduler and the display loop can be
//! exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use weatharr_core::testing::{fixtures, MockFeedSource, RecordingDisplaySink};
//!
//! let alerts = MockFeedSource::new(FeedCategory::Alerts)
//!     .with_fallback(Ok(fixtures::alerts(&[("a1", "Flood Watch")])));
//! let sink = RecordingDisplaySink::new();
//!
//! // Register the source, run the orchestrator, inspect sink.frames()...
//! ```

mod mock_feed_source;
mod recording_sink;

pub use mock_feed_source::MockFeedSource;
pub use recording_sink::RecordingDisplaySink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{Duration, TimeZone, Utc};

    use crate::feed::{
        AlertEntry, CurrentConditions, DailyForecast, DailyPeriod, FeedCategory, FeedPayload,
        ForecastText, HeadlineEntry, HourlyCurve, HourlyPoint, LatestObservations, RadarImage,
        RegionalMap, StationReading, TextForecast,
    };

    /// Current conditions with the given description.
    pub fn current_conditions(description: &str) -> FeedPayload {
        FeedPayload::CurrentConditions(CurrentConditions {
            station: "KHOU".to_string(),
            temperature_f: Some(78.0),
            humidity_pct: Some(64.0),
            wind_mph: Some(9.0),
            wind_direction: Some("SSE".to_string()),
            description: description.to_string(),
            forecast_summary: Some("Partly Sunny".to_string()),
            observed_at: None,
        })
    }

    /// A tiny radar frame.
    pub fn radar() -> FeedPayload {
        FeedPayload::Radar(RadarImage {
            source_url: "https://radar.example/conus.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        })
    }

    /// Alerts from `(id, text)` pairs, in order.
    pub fn alerts(entries: &[(&str, &str)]) -> FeedPayload {
        FeedPayload::Alerts(
            entries
                .iter()
                .map(|(id, text)| AlertEntry {
                    id: id.to_string(),
                    text: text.to_string(),
                    source_timestamp: None,
                })
                .collect(),
        )
    }

    /// Headlines from `(id, text)` pairs, in order.
    pub fn headlines(entries: &[(&str, &str)]) -> FeedPayload {
        FeedPayload::Headlines(
            entries
                .iter()
                .map(|(id, text)| HeadlineEntry {
                    id: id.to_string(),
                    text: text.to_string(),
                    source_timestamp: None,
                })
                .collect(),
        )
    }

    fn reading(id: &str, temperature_f: f64) -> StationReading {
        StationReading {
            station_id: id.to_string(),
            name: format!("{} Airport", id),
            temperature_f: Some(temperature_f),
            description: "Clear".to_string(),
            latitude: Some(29.6),
            longitude: Some(-95.2),
        }
    }

    /// A plausible payload for any category.
    pub fn payload_for(category: FeedCategory) -> FeedPayload {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        match category {
            FeedCategory::CurrentConditions => current_conditions("Sunny"),
            FeedCategory::Radar => radar(),
            FeedCategory::HourlyCurve => FeedPayload::HourlyCurve(HourlyCurve {
                points: (0..24)
                    .map(|h| HourlyPoint {
                        time: start + Duration::hours(h),
                        temperature_f: 70.0 + h as f64 / 2.0,
                        precip_chance_pct: Some(10.0),
                        cloud_cover_pct: Some(25.0),
                        short_forecast: "Sunny".to_string(),
                    })
                    .collect(),
            }),
            FeedCategory::Forecast7Day => FeedPayload::Forecast7Day(DailyForecast {
                days: vec![DailyPeriod {
                    name: "Saturday".to_string(),
                    high_f: Some(91.0),
                    low_f: Some(76.0),
                    short_forecast: "Chance Showers".to_string(),
                }],
            }),
            FeedCategory::RegionalMap => FeedPayload::RegionalMap(RegionalMap {
                readings: vec![reading("KIAH", 80.0), reading("KGLS", 83.0)],
            }),
            FeedCategory::TextForecast => FeedPayload::TextForecast(TextForecast {
                periods: vec![ForecastText {
                    name: "Tonight".to_string(),
                    detailed_forecast: "Mostly clear, with a low around 76.".to_string(),
                }],
            }),
            FeedCategory::LatestObservations => FeedPayload::LatestObservations(LatestObservations {
                rows: vec![reading("KHOU", 79.0)],
            }),
            FeedCategory::Alerts => alerts(&[("urn:alert:1", "Heat Advisory until 8 PM")]),
            FeedCategory::Headlines => headlines(&[("h1", "Tropical storm forms in the Gulf")]),
        }
    }
}
