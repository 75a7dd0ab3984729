//! api.weather.gov client.
//!
//! NWS requires a descriptive User-Agent and serves GeoJSON. The forecast,
//! hourly, gridpoint and station-list URLs come from a one-time
//! `/points/{lat},{lon}` lookup that is cached for the life of the client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use super::error::NwsError;
use crate::config::StationConfig;

const GEO_JSON: &str = "application/geo+json";

/// NWS client configuration.
#[derive(Debug, Clone)]
pub struct NwsConfig {
    pub base_url: String,
    pub radar_url: String,
    pub user_agent: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Per-request ceiling; the scheduler also bounds each fetch.
    pub request_timeout: Duration,
}

impl From<&StationConfig> for NwsConfig {
    fn from(station: &StationConfig) -> Self {
        Self {
            base_url: station.nws_base_url.trim_end_matches('/').to_string(),
            radar_url: station.radar_url.clone(),
            user_agent: station.user_agent.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// URLs resolved from the points endpoint.
#[derive(Debug, Clone)]
pub struct PointUrls {
    pub forecast: String,
    pub forecast_hourly: String,
    pub forecast_grid_data: Option<String>,
    pub observation_stations: Option<String>,
}

/// api.weather.gov client.
pub struct NwsClient {
    client: Client,
    config: NwsConfig,
    points: OnceCell<PointUrls>,
}

impl NwsClient {
    /// Create a new NWS client.
    pub fn new(config: NwsConfig) -> Result<Self, NwsError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            config,
            points: OnceCell::new(),
        })
    }

    /// Forecast, hourly and station-list URLs for the configured point.
    /// Resolved on first use; a failed lookup is retried on the next call.
    pub async fn points(&self) -> Result<&PointUrls, NwsError> {
        self.points
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/points/{:.4},{:.4}",
                    self.config.base_url, self.config.latitude, self.config.longitude
                );
                let point: PointResponse = self.get_json(&url).await?;
                let props = point.properties;
                let urls = PointUrls {
                    forecast: props.forecast.ok_or(NwsError::MissingEndpoint("forecast"))?,
                    forecast_hourly: props
                        .forecast_hourly
                        .ok_or(NwsError::MissingEndpoint("hourly forecast"))?,
                    forecast_grid_data: props.forecast_grid_data,
                    observation_stations: props.observation_stations,
                };
                debug!(forecast = %urls.forecast, "Resolved NWS point");
                Ok(urls)
            })
            .await
    }

    /// Multi-day forecast (day and night periods).
    pub async fn forecast(&self) -> Result<ForecastResponse, NwsError> {
        let url = self.points().await?.forecast.clone();
        self.get_json(&url).await
    }

    /// Hourly forecast periods.
    pub async fn hourly(&self) -> Result<ForecastResponse, NwsError> {
        let url = self.points().await?.forecast_hourly.clone();
        self.get_json(&url).await
    }

    /// Raw gridpoint layers (sky cover and friends).
    pub async fn grid_data(&self) -> Result<GridDataResponse, NwsError> {
        let url = self
            .points()
            .await?
            .forecast_grid_data
            .clone()
            .ok_or(NwsError::MissingEndpoint("forecast grid data"))?;
        self.get_json(&url).await
    }

    /// Active alerts for the configured point.
    pub async fn alerts(&self) -> Result<AlertsResponse, NwsError> {
        let url = format!(
            "{}/alerts/active?point={:.4},{:.4}",
            self.config.base_url, self.config.latitude, self.config.longitude
        );
        self.get_json(&url).await
    }

    /// Observation station URLs, nearest first.
    pub async fn observation_stations(&self, limit: usize) -> Result<Vec<String>, NwsError> {
        let url = self
            .points()
            .await?
            .observation_stations
            .clone()
            .ok_or(NwsError::MissingEndpoint("observation stations"))?;
        let stations: StationsResponse = self.get_json(&url).await?;
        Ok(stations.observation_stations.into_iter().take(limit).collect())
    }

    /// Station metadata (name, coordinates).
    pub async fn station(&self, station_url: &str) -> Result<StationResponse, NwsError> {
        self.get_json(station_url).await
    }

    /// Latest observation reported by a station.
    pub async fn latest_observation(
        &self,
        station_url: &str,
    ) -> Result<ObservationResponse, NwsError> {
        let url = format!("{}/observations/latest", station_url.trim_end_matches('/'));
        self.get_json(&url).await
    }

    /// Radar composite image bytes and their content type.
    pub async fn radar(&self) -> Result<(Vec<u8>, String), NwsError> {
        let url = &self.config.radar_url;
        debug!(url = %url, "Fetching radar image");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NwsError::ApiError {
                status: status.as_u16(),
                url: url.clone(),
                message: body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(NwsError::NoData("radar image was empty".to_string()));
        }

        Ok((bytes.to_vec(), content_type))
    }

    pub fn config(&self) -> &NwsConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NwsError> {
        debug!(url = %url, "NWS request");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, GEO_JSON)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NwsError::ApiError {
                status: status.as_u16(),
                url: url.to_string(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| NwsError::ParseError(format!("Failed to parse {}: {}", url, e)))
    }
}

// =============================================================================
// Wire types (only the fields the feeds use)
// =============================================================================

#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: PointProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    forecast: Option<String>,
    forecast_hourly: Option<String>,
    forecast_grid_data: Option<String>,
    observation_stations: Option<String>,
}

/// A measured value with its WMO unit code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeValue {
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    #[serde(default)]
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_daytime: bool,
    pub temperature: Option<f64>,
    pub temperature_unit: Option<String>,
    pub probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(default)]
    pub short_forecast: String,
    #[serde(default)]
    pub detailed_forecast: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GridDataResponse {
    #[serde(default)]
    pub properties: GridDataProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDataProperties {
    pub sky_cover: Option<GridSeries>,
}

/// A gridpoint layer: values over ISO 8601 intervals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridSeries {
    #[serde(default)]
    pub values: Vec<GridValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridValue {
    /// `start/duration`, e.g. `2024-06-01T18:00:00+00:00/PT3H`.
    pub valid_time: String,
    pub value: Option<f64>,
}

/// Parse a gridpoint `validTime` into its start and end.
pub fn parse_valid_time(valid_time: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, duration) = valid_time.split_once('/')?;
    let start = DateTime::parse_from_rfc3339(start).ok()?.with_timezone(&Utc);
    Some((start, start + parse_iso_duration(duration)?))
}

/// ISO 8601 durations as NWS emits them: `P1D`, `PT6H`, `P1DT12H`, `PT30M`.
fn parse_iso_duration(s: &str) -> Option<chrono::Duration> {
    let rest = s.strip_prefix('P')?;
    let mut total = chrono::Duration::zero();
    let mut in_time = false;
    let mut digits = String::new();
    for c in rest.chars() {
        match c {
            'T' if digits.is_empty() => in_time = true,
            '0'..='9' => digits.push(c),
            unit => {
                let n: i64 = digits.parse().ok()?;
                digits.clear();
                total += match (unit, in_time) {
                    ('W', false) => chrono::Duration::weeks(n),
                    ('D', false) => chrono::Duration::days(n),
                    ('H', true) => chrono::Duration::hours(n),
                    ('M', true) => chrono::Duration::minutes(n),
                    ('S', true) => chrono::Duration::seconds(n),
                    _ => return None,
                };
            }
        }
    }
    (digits.is_empty() && total > chrono::Duration::zero()).then_some(total)
}

#[derive(Debug, Deserialize)]
pub struct AlertsResponse {
    #[serde(default)]
    pub features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
pub struct AlertFeature {
    pub id: Option<String>,
    pub properties: AlertProperties,
}

#[derive(Debug, Deserialize)]
pub struct AlertProperties {
    pub id: Option<String>,
    pub headline: Option<String>,
    pub event: Option<String>,
    pub sent: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationsResponse {
    #[serde(default)]
    observation_stations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StationResponse {
    pub geometry: Option<PointGeometry>,
    pub properties: StationProperties,
}

#[derive(Debug, Deserialize)]
pub struct PointGeometry {
    /// GeoJSON order: longitude, latitude.
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProperties {
    pub station_identifier: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ObservationResponse {
    pub properties: ObservationProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationProperties {
    pub timestamp: Option<DateTime<Utc>>,
    pub text_description: Option<String>,
    pub temperature: Option<QuantitativeValue>,
    pub relative_humidity: Option<QuantitativeValue>,
    pub wind_speed: Option<QuantitativeValue>,
    pub wind_direction: Option<QuantitativeValue>,
}
