//! Weather advisories for the nearest collection day.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::AdvisoryThresholds;
use crate::model::{Advisory, AdvisoryKind, BinSchedule, Severity, WeatherSample};
use crate::ports::ForecastPort;

/// Evaluates forecast rules against collection dates.
pub struct WeatherAdvisor {
    forecast: Arc<dyn ForecastPort>,
    clock: Arc<dyn Clock>,
    thresholds: AdvisoryThresholds,
}

impl WeatherAdvisor {
    /// Create an advisor using `forecast` for weather data.
    #[must_use]
    pub fn new(
        forecast: Arc<dyn ForecastPort>,
        clock: Arc<dyn Clock>,
        thresholds: AdvisoryThresholds,
    ) -> Self {
        Self {
            forecast,
            clock,
            thresholds,
        }
    }

    /// Advisories for the earliest known collection in `schedule`.
    pub async fn for_schedule(&self, schedule: &BinSchedule) -> Vec<Advisory> {
        match schedule.earliest() {
            Some(next) => self.evaluate(next.day()).await,
            None => Vec::new(),
        }
    }

    /// Advisories for `target`; empty outside the forecast horizon or when the forecast fails.
    pub async fn evaluate(&self, target: NaiveDate) -> Vec<Advisory> {
        let days_ahead = (target - self.clock.today()).num_days();
        if days_ahead < 0 || days_ahead > self.thresholds.horizon_days {
            debug!(%target, days_ahead, "collection outside forecast horizon");
            return Vec::new();
        }
        let Ok(days_ahead) = u32::try_from(days_ahead) else {
            return Vec::new();
        };

        match self.forecast.daily(days_ahead).await {
            Ok(sample) => advisories(&sample, &self.thresholds),
            Err(err) => {
                warn!(%target, error = %err, "forecast unavailable");
                Vec::new()
            }
        }
    }
}

/// Apply the wind and rain rules to one forecast day. Both rules may fire.
#[must_use]
pub fn advisories(sample: &WeatherSample, thresholds: &AdvisoryThresholds) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if sample.wind_kmh >= thresholds.wind_info_kmh {
        let severity = if sample.wind_kmh >= thresholds.wind_warning_kmh {
            Severity::Warning
        } else {
            Severity::Info
        };
        advisories.push(Advisory {
            kind: AdvisoryKind::Wind,
            severity,
            message: format!("Windy ({} km/h) - secure your bins!", whole(sample.wind_kmh)),
        });
    }

    if sample.rainfall_mm >= thresholds.rain_mm {
        advisories.push(Advisory {
            kind: AdvisoryKind::Rain,
            severity: Severity::Info,
            message: format!(
                "Rain expected ({}mm) - good for weighing down FOGO",
                whole(sample.rainfall_mm)
            ),
        });
    }

    advisories
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "forecast values are small, non-negative magnitudes"
)]
fn whole(value: f64) -> i64 {
    value.floor() as i64
}
