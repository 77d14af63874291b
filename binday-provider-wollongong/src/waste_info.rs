//! Ports backed by `wollongong.waste-info.com.au`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use binday_core::{
    clock::Clock,
    config::EngineConfig,
    model::{
        BinSchedule, Locality, LocalityId, Material, MaterialBin, MunicipalEvent, Property,
        PropertyId, ScheduleResponse, Street, StreetId,
    },
    ports::{PortError, ReferencePort, SchedulePort},
};

use crate::fetch_json;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Response wrapper from /localities.json
#[derive(Debug, Deserialize)]
struct LocalitiesResponse {
    #[serde(default)]
    localities: Vec<LocalityEntry>,
}

#[derive(Debug, Deserialize)]
struct LocalityEntry {
    id: i64,
    name: String,
}

/// Response wrapper from /streets.json?locality=ID
#[derive(Debug, Deserialize)]
struct StreetsResponse {
    #[serde(default)]
    streets: Vec<StreetEntry>,
}

#[derive(Debug, Deserialize)]
struct StreetEntry {
    id: i64,
    name: String,
    #[serde(default)]
    locality_id: Option<i64>,
}

/// Response wrapper from /properties.json?street=ID
#[derive(Debug, Deserialize)]
struct PropertiesResponse {
    #[serde(default)]
    properties: Vec<PropertyEntry>,
}

#[derive(Debug, Deserialize)]
struct PropertyEntry {
    id: i64,
    name: String,
    #[serde(default)]
    street_id: Option<i64>,
}

/// Response wrapper from /materials.json
#[derive(Debug, Deserialize)]
struct MaterialsResponse {
    #[serde(default)]
    materials: Vec<MaterialEntry>,
}

#[derive(Debug, Deserialize)]
struct MaterialEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    bin_type: Option<String>,
}

/// /events.json has been seen both as a bare array and wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventsResponse {
    Bare(Vec<EventEntry>),
    Wrapped { events: Vec<EventEntry> },
}

#[derive(Debug, Deserialize)]
struct EventEntry {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
}

/// Reference data (setup chain, A-Z guide, events) for Wollongong.
pub struct WollongongReferencePort {
    client: Client,
    api_base: String,
}

impl WollongongReferencePort {
    /// Create a new reference port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: &EngineConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl ReferencePort for WollongongReferencePort {
    async fn localities(&self) -> Result<Vec<Locality>, PortError> {
        let resp = fetch_json::<LocalitiesResponse>(
            self.client.get(format!("{}/localities.json", self.api_base)),
        )
        .await?;

        Ok(resp
            .localities
            .into_iter()
            .map(|entry| Locality {
                id: LocalityId(entry.id),
                name: entry.name,
            })
            .collect())
    }

    async fn streets(&self, locality: LocalityId) -> Result<Vec<Street>, PortError> {
        let req = self
            .client
            .get(format!("{}/streets.json", self.api_base))
            .query(&[("locality", locality.0)]);
        let resp = fetch_json::<StreetsResponse>(req).await?;

        Ok(resp
            .streets
            .into_iter()
            .map(|entry| Street {
                id: StreetId(entry.id),
                name: entry.name,
                locality_id: entry.locality_id.map_or(locality, LocalityId),
            })
            .collect())
    }

    async fn properties(&self, street: StreetId) -> Result<Vec<Property>, PortError> {
        let req = self
            .client
            .get(format!("{}/properties.json", self.api_base))
            .query(&[("street", street.0)]);
        let resp = fetch_json::<PropertiesResponse>(req).await?;

        Ok(resp
            .properties
            .into_iter()
            .map(|entry| Property {
                id: PropertyId(entry.id),
                name: entry.name,
                street_id: entry.street_id.map_or(street, StreetId),
            })
            .collect())
    }

    async fn materials(&self) -> Result<Vec<Material>, PortError> {
        let resp = fetch_json::<MaterialsResponse>(
            self.client.get(format!("{}/materials.json", self.api_base)),
        )
        .await?;

        Ok(resp
            .materials
            .into_iter()
            .map(|entry| Material {
                title: entry.title,
                keywords: entry.keywords,
                // Untyped entries are treated as landfill, as the council guide does.
                bin: MaterialBin::from(entry.bin_type.unwrap_or_else(|| "waste".to_owned())),
            })
            .collect())
    }

    async fn events(&self) -> Result<Vec<MunicipalEvent>, PortError> {
        let resp = fetch_json::<EventsResponse>(
            self.client.get(format!("{}/events.json", self.api_base)),
        )
        .await?;

        let entries = match resp {
            EventsResponse::Bare(entries) | EventsResponse::Wrapped { events: entries } => entries,
        };

        Ok(entries
            .into_iter()
            .map(|entry| {
                let start_date = entry.start_date.as_deref().and_then(|raw| {
                    NaiveDate::parse_from_str(raw, DATE_FORMAT)
                        .inspect_err(|err| debug!(raw, error = %err, "skipping event date"))
                        .ok()
                });
                MunicipalEvent {
                    title: entry.title.unwrap_or_else(|| "Upcoming Event".to_owned()),
                    start_date,
                }
            })
            .collect())
    }
}

/// Per-property collection schedules for Wollongong.
pub struct WollongongSchedulePort {
    client: Client,
    api_base: String,
    offset: FixedOffset,
    clock: Arc<dyn Clock>,
}

impl WollongongSchedulePort {
    /// Create a new schedule port; `clock` anchors schedules synthesized from a collection day.
    #[must_use]
    pub fn new(client: Client, config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            offset: config.collection_offset,
            clock,
        }
    }
}

#[async_trait]
impl SchedulePort for WollongongSchedulePort {
    async fn schedule(&self, property: PropertyId) -> Result<BinSchedule, PortError> {
        let resp = fetch_json::<ScheduleResponse>(
            self.client
                .get(format!("{}/properties/{property}.json", self.api_base)),
        )
        .await?;

        if resp.collections.is_empty() {
            debug!(%property, collection_day = ?resp.collection_day, "no explicit collections");
        }

        Ok(resp.into_schedule(self.clock.today(), self.offset))
    }
}
