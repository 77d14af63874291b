//! Engine configuration: endpoints, location, thresholds, and storage paths.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::model::BinKind;

const DEFAULT_API_BASE: &str = "https://wollongong.waste-info.com.au/api/v1";
const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const WOLLONGONG_LAT: f64 = -34.4278;
const WOLLONGONG_LON: f64 = 150.8931;
const FORECAST_TIMEZONE: &str = "Australia/Sydney";
// Offset the upstream uses for its collection timestamps.
const COLLECTION_OFFSET_SECS: i32 = 11 * 3600;

const CONFIG_FILE: &str = "config.json";
const CACHE_FILE: &str = "cache.json";
const CALENDAR_FILE: &str = "bin_collection.ics";

#[derive(Debug, Clone, Copy, PartialEq)]
/// Limits for weather advisories.
pub struct AdvisoryThresholds {
    /// Wind speed (km/h) from which a wind advisory is raised.
    pub wind_info_kmh: f64,
    /// Wind speed (km/h) from which the wind advisory is a warning.
    pub wind_warning_kmh: f64,
    /// Daily rainfall (mm) from which a rain advisory is raised.
    pub rain_mm: f64,
    /// Furthest day ahead the forecast is consulted for.
    pub horizon_days: i64,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            wind_info_kmh: 40.0,
            wind_warning_kmh: 50.0,
            rain_mm: 5.0,
            horizon_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Names used for each bin in exported calendars.
pub struct BinLabels {
    /// Organic bin label.
    pub organic: String,
    /// Recycling bin label.
    pub recycling: String,
    /// Landfill bin label.
    pub landfill: String,
}

impl BinLabels {
    /// Label for `kind`.
    #[must_use]
    pub fn label(&self, kind: BinKind) -> &str {
        match kind {
            BinKind::Organic => &self.organic,
            BinKind::Recycling => &self.recycling,
            BinKind::Landfill => &self.landfill,
        }
    }
}

impl Default for BinLabels {
    fn default() -> Self {
        Self {
            organic: "FOGO Bin".to_owned(),
            recycling: "Recycling Bin".to_owned(),
            landfill: "Landfill Bin".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
/// Everything the engine needs to know about its environment.
pub struct EngineConfig {
    /// Base URL of the waste-info API.
    pub api_base: String,
    /// Open-Meteo forecast endpoint.
    pub forecast_url: String,
    /// Latitude used for forecasts.
    pub latitude: f64,
    /// Longitude used for forecasts.
    pub longitude: f64,
    /// IANA zone name passed to the forecast service so days line up locally.
    pub forecast_timezone: String,
    /// Upper bound for every HTTP request.
    pub request_timeout: Duration,
    /// Offset given to collections that carry only a calendar date.
    pub collection_offset: FixedOffset,
    /// Directory holding the config, cache, and exported calendar.
    pub data_dir: PathBuf,
    /// Weather advisory limits.
    pub thresholds: AdvisoryThresholds,
    /// Hours before the collection day starts that the calendar alarm fires.
    pub alarm_lead_hours: u32,
    /// Bin names used in calendar events.
    pub labels: BinLabels,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            forecast_url: DEFAULT_FORECAST_URL.to_owned(),
            latitude: WOLLONGONG_LAT,
            longitude: WOLLONGONG_LON,
            forecast_timezone: FORECAST_TIMEZONE.to_owned(),
            request_timeout: Duration::from_secs(10),
            collection_offset: FixedOffset::east_opt(COLLECTION_OFFSET_SECS).unwrap_or(Utc.fix()),
            data_dir: PathBuf::from("."),
            thresholds: AdvisoryThresholds::default(),
            alarm_lead_hours: 18,
            labels: BinLabels::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with `BINDAY_DATA_DIR`, `BINDAY_API_BASE` and `BINDAY_FORECAST_URL` applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var_os("BINDAY_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(base) = env::var("BINDAY_API_BASE") {
            config.api_base = base;
        }
        if let Ok(url) = env::var("BINDAY_FORECAST_URL") {
            config.forecast_url = url;
        }
        config
    }

    /// Same configuration storing its files under `dir`.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Location of the persisted setup record.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Location of the persisted schedule cache.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join(CACHE_FILE)
    }

    /// Default destination for calendar exports.
    #[must_use]
    pub fn calendar_path(&self) -> PathBuf {
        self.data_dir.join(CALENDAR_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_wollongong() {
        let config = EngineConfig::default();

        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.collection_offset.local_minus_utc(), 11 * 3600);
        assert_eq!(config.thresholds.horizon_days, 7);
        assert_eq!(config.alarm_lead_hours, 18);
        assert_eq!(config.labels.label(BinKind::Organic), "FOGO Bin");
    }

    #[test]
    fn paths_live_in_data_dir() {
        let config = EngineConfig::default().with_data_dir("/tmp/binday");

        assert_eq!(config.config_path(), PathBuf::from("/tmp/binday/config.json"));
        assert_eq!(config.cache_path(), PathBuf::from("/tmp/binday/cache.json"));
        assert_eq!(
            config.calendar_path(),
            PathBuf::from("/tmp/binday/bin_collection.ics")
        );
    }
}
