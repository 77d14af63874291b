//! Bundle of ports implementing one municipality's data sources.

use std::sync::Arc;

use crate::ports::{ForecastPort, ReferencePort, SchedulePort};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Metadata describing the municipality a plugin serves.
pub struct MunicipalityMeta {
    /// Stable identifier, e.g. `wollongong`.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Collection of ports implementing a provider for the municipality.
pub struct MunicipalityPlugin {
    /// Static metadata describing the municipality.
    pub meta: MunicipalityMeta,
    /// Localities, streets, properties, materials, and events.
    pub reference_port: Arc<dyn ReferencePort>,
    /// Per-property collection schedules.
    pub schedule_port: Arc<dyn SchedulePort>,
    /// Daily weather forecasts.
    pub forecast_port: Arc<dyn ForecastPort>,
}
