//! NWS-backed feed sources, one per category.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

use super::cities::{major_cities_near, regional_readings};
use super::error::NwsError;
use super::nws::{
    parse_valid_time, AlertsResponse, ForecastPeriod, ForecastResponse, GridDataResponse,
    NwsClient, ObservationProperties, QuantitativeValue, StationResponse,
};
use crate::feed::{
    AlertEntry, CurrentConditions, DailyForecast, DailyPeriod, FeedCategory, FeedPayload,
    FeedSource, FetchFailure, ForecastText, HourlyCurve, HourlyPoint, LatestObservations,
    RadarImage, RegionalMap, StationReading, TextForecast,
};

/// Hourly periods on the hourly curve.
const HOURLY_POINTS: usize = 24;
/// Days on the 7-day panel.
const DAILY_DAYS: usize = 7;
/// Periods on the text forecast panel.
const TEXT_PERIODS: usize = 4;
/// Alerts passed to the ticker.
const MAX_ALERTS: usize = 10;
/// Radius searched for regional map cities.
const REGIONAL_RADIUS_MILES: f64 = 360.0;
/// Cities considered for the regional map.
const REGIONAL_TARGETS: usize = 12;
/// Readings plotted on the regional map.
const REGIONAL_POINTS: usize = 8;

/// Serves one panel category (or alerts) from api.weather.gov.
pub struct NwsFeedSource {
    name: String,
    category: FeedCategory,
    client: Arc<NwsClient>,
    station_limit: usize,
    regional_station_limit: usize,
}

impl NwsFeedSource {
    /// `category` must not be [`FeedCategory::Headlines`]; headlines come
    /// from RSS.
    pub fn new(
        client: Arc<NwsClient>,
        category: FeedCategory,
        station_limit: usize,
        regional_station_limit: usize,
    ) -> Self {
        Self {
            name: format!("nws-{}", category),
            category,
            client,
            station_limit: station_limit.max(1),
            regional_station_limit: regional_station_limit.max(1),
        }
    }

    async fn fetch_payload(&self) -> Result<FeedPayload, NwsError> {
        match self.category {
            FeedCategory::CurrentConditions => self.current_conditions().await,
            FeedCategory::Radar => {
                let (bytes, content_type) = self.client.radar().await?;
                Ok(FeedPayload::Radar(RadarImage {
                    source_url: self.client.config().radar_url.clone(),
                    content_type,
                    bytes,
                }))
            }
            FeedCategory::HourlyCurve => {
                let (hourly, grid) = futures::join!(self.client.hourly(), self.client.grid_data());
                let grid = grid
                    .map_err(|e| debug!(error = %e, "Sky cover unavailable for hourly curve"))
                    .ok();
                Ok(FeedPayload::HourlyCurve(hourly_curve_from(
                    &hourly?,
                    grid.as_ref(),
                )))
            }
            FeedCategory::Forecast7Day => {
                let forecast = self.client.forecast().await?;
                Ok(FeedPayload::Forecast7Day(daily_forecast_from(&forecast)))
            }
            FeedCategory::TextForecast => {
                let forecast = self.client.forecast().await?;
                Ok(FeedPayload::TextForecast(text_forecast_from(&forecast)))
            }
            FeedCategory::LatestObservations => {
                let rows = self.station_readings(self.station_limit).await?;
                Ok(FeedPayload::LatestObservations(LatestObservations { rows }))
            }
            FeedCategory::RegionalMap => {
                let readings = self.station_readings(self.regional_station_limit).await?;
                let config = self.client.config();
                let targets = major_cities_near(
                    config.latitude,
                    config.longitude,
                    REGIONAL_RADIUS_MILES,
                    REGIONAL_TARGETS,
                );
                Ok(FeedPayload::RegionalMap(RegionalMap {
                    readings: regional_readings(readings, &targets, REGIONAL_POINTS),
                }))
            }
            FeedCategory::Alerts => {
                let alerts = self.client.alerts().await?;
                Ok(FeedPayload::Alerts(alerts_from(&alerts)))
            }
            FeedCategory::Headlines => Err(NwsError::NoData(
                "headlines are not served by NWS".to_string(),
            )),
        }
    }

    async fn current_conditions(&self) -> Result<FeedPayload, NwsError> {
        let stations = self.client.observation_stations(1).await?;
        let station_url = stations
            .first()
            .ok_or_else(|| NwsError::NoData("no observation stations near point".to_string()))?;

        let (station, observation, forecast) = futures::join!(
            self.client.station(station_url),
            self.client.latest_observation(station_url),
            self.client.forecast(),
        );
        let observation = observation?;

        // The forecast only adds a summary line; conditions stand on their own.
        let forecast = match forecast {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                debug!(error = %e, "Forecast unavailable for current conditions");
                None
            }
        };
        let station_name = station
            .ok()
            .map(|s| station_label(station_url, &s))
            .unwrap_or_else(|| station_id_from_url(station_url));

        Ok(FeedPayload::CurrentConditions(current_conditions_from(
            station_name,
            &observation.properties,
            forecast.as_ref(),
        )))
    }

    /// Readings for the nearest `limit` stations. Stations that fail are
    /// left out; it is an error only when all of them fail.
    async fn station_readings(&self, limit: usize) -> Result<Vec<StationReading>, NwsError> {
        let stations = self.client.observation_stations(limit).await?;
        if stations.is_empty() {
            return Err(NwsError::NoData("no observation stations near point".to_string()));
        }

        let results = join_all(stations.iter().map(|url| async move {
            let (station, observation) = futures::join!(
                self.client.station(url),
                self.client.latest_observation(url)
            );
            Ok::<_, NwsError>(station_reading_from(url, &station?, &observation?.properties))
        }))
        .await;

        let mut readings = Vec::with_capacity(results.len());
        let mut last_error = None;
        for result in results {
            match result {
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    debug!(error = %e, "Skipping station");
                    last_error = Some(e);
                }
            }
        }

        match (readings.is_empty(), last_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(readings),
        }
    }
}

#[async_trait]
impl FeedSource for NwsFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> FeedCategory {
        self.category
    }

    async fn fetch(&self) -> Result<FeedPayload, FetchFailure> {
        self.fetch_payload().await.map_err(FetchFailure::from)
    }
}

// =============================================================================
// Unit conversion
// =============================================================================

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Temperature in °F. Observations default to °C when no unit is given.
pub fn temperature_f(value: &QuantitativeValue) -> Option<f64> {
    let v = value.value?;
    let f = match value.unit_code.as_deref() {
        Some(unit) if unit.ends_with("degF") => v,
        _ => v * 9.0 / 5.0 + 32.0,
    };
    Some(round1(f))
}

/// Speed in mph. Observations default to km/h when no unit is given.
pub fn speed_mph(value: &QuantitativeValue) -> Option<f64> {
    let v = value.value?;
    let mph = match value.unit_code.as_deref() {
        Some(unit) if unit.ends_with("m_s-1") => v * 2.236_936,
        Some(unit) if unit.ends_with("mi_h-1") => v,
        Some(unit) if unit.ends_with("kt") => v * 1.150_779,
        _ => v / 1.609_344,
    };
    Some(round1(mph))
}

/// 16-point compass name for a bearing in degrees.
pub fn compass_point(degrees: f64) -> Option<&'static str> {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    if !degrees.is_finite() {
        return None;
    }
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % POINTS.len();
    Some(POINTS[index])
}

fn period_temperature_f(period: &ForecastPeriod) -> Option<f64> {
    let t = period.temperature?;
    match period.temperature_unit.as_deref() {
        Some("C") => Some(round1(t * 9.0 / 5.0 + 32.0)),
        _ => Some(t),
    }
}

// =============================================================================
// Payload mapping
// =============================================================================

fn station_id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

fn station_label(url: &str, station: &StationResponse) -> String {
    station
        .properties
        .name
        .clone()
        .or_else(|| station.properties.station_identifier.clone())
        .unwrap_or_else(|| station_id_from_url(url))
}

pub fn current_conditions_from(
    station: String,
    obs: &ObservationProperties,
    forecast: Option<&ForecastResponse>,
) -> CurrentConditions {
    let first_period = forecast.and_then(|f| f.properties.periods.first());

    CurrentConditions {
        station,
        temperature_f: obs.temperature.as_ref().and_then(temperature_f),
        humidity_pct: obs
            .relative_humidity
            .as_ref()
            .and_then(|h| h.value)
            .map(f64::round),
        wind_mph: obs.wind_speed.as_ref().and_then(speed_mph),
        wind_direction: obs
            .wind_direction
            .as_ref()
            .and_then(|d| d.value)
            .and_then(compass_point)
            .map(str::to_string),
        description: obs
            .text_description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "Current conditions".to_string()),
        forecast_summary: first_period
            .map(|p| p.short_forecast.clone())
            .filter(|s| !s.is_empty()),
        observed_at: obs.timestamp,
    }
}

/// Hourly points, each with the sky cover of the grid interval containing
/// its start time when grid data is given.
pub fn hourly_curve_from(
    hourly: &ForecastResponse,
    grid: Option<&GridDataResponse>,
) -> HourlyCurve {
    let sky_cover: Vec<_> = grid
        .and_then(|g| g.properties.sky_cover.as_ref())
        .map(|series| {
            series
                .values
                .iter()
                .filter_map(|v| {
                    let (start, end) = parse_valid_time(&v.valid_time)?;
                    Some((start, end, v.value?))
                })
                .collect()
        })
        .unwrap_or_default();

    let points = hourly
        .properties
        .periods
        .iter()
        .filter_map(|period| {
            let time = period.start_time?;
            Some(HourlyPoint {
                time,
                temperature_f: period_temperature_f(period)?,
                precip_chance_pct: period
                    .probability_of_precipitation
                    .as_ref()
                    .and_then(|p| p.value),
                cloud_cover_pct: sky_cover
                    .iter()
                    .find(|(start, end, _)| *start <= time && time < *end)
                    .map(|(_, _, value)| *value),
                short_forecast: period.short_forecast.clone(),
            })
        })
        .take(HOURLY_POINTS)
        .collect();
    HourlyCurve { points }
}

/// Merge day/night periods into days: each daytime period gives the high,
/// the night right after it gives the low. A leading night period (evening
/// forecasts) is skipped.
pub fn daily_forecast_from(forecast: &ForecastResponse) -> DailyForecast {
    let periods = &forecast.properties.periods;
    let days = periods
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_daytime)
        .map(|(i, day)| {
            let night = periods.get(i + 1).filter(|p| !p.is_daytime);
            DailyPeriod {
                name: day.name.clone(),
                high_f: period_temperature_f(day),
                low_f: night.and_then(period_temperature_f),
                short_forecast: day.short_forecast.clone(),
            }
        })
        .take(DAILY_DAYS)
        .collect();
    DailyForecast { days }
}

pub fn text_forecast_from(forecast: &ForecastResponse) -> TextForecast {
    let periods = forecast
        .properties
        .periods
        .iter()
        .filter(|p| !p.detailed_forecast.trim().is_empty())
        .take(TEXT_PERIODS)
        .map(|p| ForecastText {
            name: p.name.clone(),
            detailed_forecast: p.detailed_forecast.clone(),
        })
        .collect();
    TextForecast { periods }
}

/// Alerts in upstream order. Entries without an id or any text are dropped.
pub fn alerts_from(alerts: &AlertsResponse) -> Vec<AlertEntry> {
    alerts
        .features
        .iter()
        .filter_map(|feature| {
            let props = &feature.properties;
            let id = props.id.clone().or_else(|| feature.id.clone())?;
            let text = props
                .headline
                .clone()
                .or_else(|| props.event.clone())?
                .trim()
                .to_string();
            if text.is_empty() {
                return None;
            }
            Some(AlertEntry {
                id,
                text,
                source_timestamp: props.sent,
            })
        })
        .take(MAX_ALERTS)
        .collect()
}

pub fn station_reading_from(
    url: &str,
    station: &StationResponse,
    obs: &ObservationProperties,
) -> StationReading {
    let coordinates = station
        .geometry
        .as_ref()
        .map(|g| g.coordinates.as_slice())
        .unwrap_or_default();

    StationReading {
        station_id: station
            .properties
            .station_identifier
            .clone()
            .unwrap_or_else(|| station_id_from_url(url)),
        name: station_label(url, station),
        temperature_f: obs.temperature.as_ref().and_then(temperature_f),
        description: obs
            .text_description
            .clone()
            .unwrap_or_else(|| "--".to_string()),
        longitude: coordinates.first().copied(),
        latitude: coordinates.get(1).copied(),
    }
}
