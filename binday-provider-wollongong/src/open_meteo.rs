//! Daily forecasts from Open-Meteo (no API key required).

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use binday_core::{
    config::EngineConfig,
    model::WeatherSample,
    ports::{ForecastPort, PortError},
};

use crate::fetch_json;

const DAILY_FIELDS: &str = "precipitation_sum,wind_speed_10m_max,weather_code";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Response from /v1/forecast
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily: Option<Daily>,
}

/// Arrays indexed by day offset from today.
#[derive(Debug, Deserialize)]
struct Daily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
}

/// Forecast port for a fixed latitude/longitude.
pub struct OpenMeteoForecastPort {
    client: Client,
    url: String,
    latitude: f64,
    longitude: f64,
    timezone: String,
}

impl OpenMeteoForecastPort {
    /// Create a new forecast port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: &EngineConfig) -> Self {
        Self {
            client,
            url: config.forecast_url.clone(),
            latitude: config.latitude,
            longitude: config.longitude,
            timezone: config.forecast_timezone.clone(),
        }
    }
}

#[async_trait]
impl ForecastPort for OpenMeteoForecastPort {
    async fn daily(&self, days_ahead: u32) -> Result<WeatherSample, PortError> {
        let forecast_days = (days_ahead + 1).to_string();
        let req = self.client.get(self.url.as_str()).query(&[
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("daily", DAILY_FIELDS.to_owned()),
            ("timezone", self.timezone.clone()),
            ("forecast_days", forecast_days),
        ]);

        let resp = fetch_json::<ForecastResponse>(req).await?;
        let daily = resp
            .daily
            .ok_or_else(|| PortError::MissingData("forecast has no daily block".into()))?;

        let index = usize::try_from(days_ahead)
            .map_err(|_err| PortError::MissingData(format!("day {days_ahead} out of range")))?;

        let date = daily
            .time
            .get(index)
            .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
            .ok_or_else(|| PortError::MissingData(format!("forecast has no day {days_ahead}")))?;

        Ok(WeatherSample {
            date,
            rainfall_mm: daily.precipitation_sum.get(index).copied().flatten().unwrap_or(0.0),
            wind_kmh: daily.wind_speed_10m_max.get(index).copied().flatten().unwrap_or(0.0),
            weather_code: daily.weather_code.get(index).copied().flatten(),
        })
    }
}
