//! Traits describing provider capabilities and shared helper types.

use async_trait::async_trait;
use reqwest::{Error as ReqwestError, StatusCode};

use crate::model::{
    BinSchedule, Locality, LocalityId, Material, MunicipalEvent, Property, PropertyId, Street,
    StreetId, WeatherSample,
};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to provider backends.
pub enum PortError {
    /// Connection failure or timeout.
    #[error("Network error: {0}")]
    Transport(#[source] ReqwestError),
    /// The backend answered with a non-success status.
    #[error("Unexpected status: {0}")]
    Status(StatusCode),
    /// The body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(#[source] ReqwestError),
    /// The body decoded but lacks the requested data.
    #[error("Missing data: {0}")]
    MissingData(String),
}

#[async_trait]
/// Reference data used while setting up a property and by the auxiliary views.
pub trait ReferencePort: Send + Sync {
    /// All localities of the municipality.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn localities(&self) -> Result<Vec<Locality>, PortError>;

    /// Streets in a locality.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn streets(&self, locality: LocalityId) -> Result<Vec<Street>, PortError>;

    /// Properties on a street.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn properties(&self, street: StreetId) -> Result<Vec<Property>, PortError>;

    /// A-Z guide of materials and where they go.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn materials(&self) -> Result<Vec<Material>, PortError>;

    /// Municipal events such as clean-up days.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn events(&self) -> Result<Vec<MunicipalEvent>, PortError>;
}

#[async_trait]
/// Source of per-property collection schedules.
pub trait SchedulePort: Send + Sync {
    /// Fetch and normalize the schedule for a property.
    ///
    /// Implementations synthesize a schedule from the weekly collection day when the
    /// backend lists no explicit collections.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn schedule(&self, property: PropertyId) -> Result<BinSchedule, PortError>;
}

#[async_trait]
/// Source of daily weather forecasts for the municipality.
pub trait ForecastPort: Send + Sync {
    /// Forecast for the day `days_ahead` days from today.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the day is outside the forecast.
    async fn daily(&self, days_ahead: u32) -> Result<WeatherSample, PortError>;
}
