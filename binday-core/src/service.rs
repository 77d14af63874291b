//! High-level service facade combining the provider, stores, and engine components.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::calendar::CalendarExporter;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{self, EVENT_WINDOW_DAYS};
use crate::materials;
use crate::model::{
    Advisory, BinSchedule, Locality, LocalityId, Material, MunicipalEvent, Property, PropertyId,
    Resolution, Street, StreetId,
};
use crate::plugin::{MunicipalityMeta, MunicipalityPlugin};
use crate::resolver::ScheduleResolver;
use crate::store::{self, ConfigRecord, ConfigStore, FileScheduleCache};
use crate::weather::WeatherAdvisor;

/// Public entry point for setup, schedule resolution, advisories, and export.
pub struct BinDayService {
    plugin: MunicipalityPlugin,
    resolver: ScheduleResolver,
    advisor: WeatherAdvisor,
    exporter: CalendarExporter,
    config_store: ConfigStore,
    clock: Arc<dyn Clock>,
    calendar_path: PathBuf,
}

impl BinDayService {
    /// Create a service using the system clock and file stores under `config.data_dir`.
    #[must_use]
    pub fn new(plugin: MunicipalityPlugin, config: &EngineConfig) -> Self {
        Self::with_clock(plugin, config, Arc::new(SystemClock))
    }

    /// Create a service with an explicit clock.
    #[must_use]
    pub fn with_clock(
        plugin: MunicipalityPlugin,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(FileScheduleCache::new(config.cache_path()));
        let resolver = ScheduleResolver::new(
            Arc::clone(&plugin.schedule_port),
            cache,
            Arc::clone(&clock),
        );
        let advisor = WeatherAdvisor::new(
            Arc::clone(&plugin.forecast_port),
            Arc::clone(&clock),
            config.thresholds,
        );
        let exporter = CalendarExporter::new(config.labels.clone(), config.alarm_lead_hours);

        Self {
            plugin,
            resolver,
            advisor,
            exporter,
            config_store: ConfigStore::new(config.config_path()),
            clock,
            calendar_path: config.calendar_path(),
        }
    }

    /// Municipality served by the plugin.
    #[must_use]
    pub fn municipality(&self) -> &MunicipalityMeta {
        &self.plugin.meta
    }

    /// Current time according to the engine's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Localities sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the provider request fails.
    pub async fn localities(&self) -> Result<Vec<Locality>, EngineError> {
        let mut localities = self.plugin.reference_port.localities().await?;
        localities.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(localities)
    }

    /// Streets of a locality sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the provider request fails.
    pub async fn streets(&self, locality: LocalityId) -> Result<Vec<Street>, EngineError> {
        let mut streets = self.plugin.reference_port.streets(locality).await?;
        streets.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(streets)
    }

    /// Properties of a street sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the provider request fails.
    pub async fn properties(&self, street: StreetId) -> Result<Vec<Property>, EngineError> {
        let mut properties = self.plugin.reference_port.properties(street).await?;
        properties.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(properties)
    }

    /// Persist `property` as the tracked property, replacing any earlier setup.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Persistence`] when the config cannot be written.
    pub fn complete_setup(&self, property: PropertyId) -> Result<ConfigRecord, EngineError> {
        let record = ConfigRecord {
            property_id: property,
            setup_completed: true,
            setup_date: self.clock.now(),
        };
        self.config_store.save(&record)?;
        info!(%property, "setup completed");
        Ok(record)
    }

    /// Completed setup record, `None` when setup is still required.
    #[must_use]
    pub fn current_config(&self) -> Option<ConfigRecord> {
        match self.config_store.load() {
            Ok(record) => record.filter(|record| record.setup_completed),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable config");
                None
            }
        }
    }

    /// Cached schedule for an immediate first paint.
    #[must_use]
    pub fn warm_start(&self) -> Option<Resolution> {
        self.resolver.warm_start()
    }

    /// Resolve the schedule for `property` from remote data with cache fallback.
    pub async fn resolve(&self, property: PropertyId) -> Resolution {
        self.resolver.resolve(property).await
    }

    /// Re-fetch the schedule for `property`.
    pub async fn refresh(&self, property: PropertyId) -> Resolution {
        self.resolver.refresh(property).await
    }

    /// Weather advisories for the nearest collection in `schedule`.
    pub async fn advisories(&self, schedule: &BinSchedule) -> Vec<Advisory> {
        self.advisor.for_schedule(schedule).await
    }

    /// iCalendar document for `schedule`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ExportEmpty`] when the schedule has no dates.
    pub fn export_calendar(&self, schedule: &BinSchedule) -> Result<Vec<u8>, EngineError> {
        self.exporter.export(schedule, self.clock.now())
    }

    /// Export `schedule` to the configured calendar file and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ExportEmpty`] for an empty schedule, or
    /// [`EngineError::Persistence`] when the file cannot be written.
    pub fn save_calendar(&self, schedule: &BinSchedule) -> Result<PathBuf, EngineError> {
        let document = self.export_calendar(schedule)?;
        store::write_atomic(&self.calendar_path, &document)?;
        info!(path = %self.calendar_path.display(), "calendar exported");
        Ok(self.calendar_path.clone())
    }

    /// Guide entries matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the guide cannot be fetched.
    pub async fn which_bin(&self, query: &str) -> Result<Vec<Material>, EngineError> {
        let guide = self.plugin.reference_port.materials().await?;
        Ok(materials::search(&guide, query).into_iter().cloned().collect())
    }

    /// Next municipal event within the coming month, if the event list is reachable.
    pub async fn upcoming_event(&self) -> Option<MunicipalEvent> {
        match self.plugin.reference_port.events().await {
            Ok(list) => {
                events::upcoming(&list, self.clock.today(), EVENT_WINDOW_DAYS).cloned()
            }
            Err(err) => {
                warn!(error = %err, "events unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone};
    use reqwest::StatusCode;

    use super::*;
    use crate::clock::FixedClock;
    use crate::model::{BinKind, Freshness, MaterialBin, NextCollection, WeatherSample};
    use crate::ports::{ForecastPort, PortError, ReferencePort, SchedulePort};

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(11 * 3600).expect("valid offset")
    }

    fn now() -> DateTime<FixedOffset> {
        offset()
            .with_ymd_and_hms(2026, 10, 19, 8, 0, 0)
            .single()
            .expect("unambiguous")
    }

    fn today() -> NaiveDate {
        now().date_naive()
    }

    struct FakeMunicipality {
        online: bool,
    }

    #[async_trait]
    impl ReferencePort for FakeMunicipality {
        async fn localities(&self) -> Result<Vec<Locality>, PortError> {
            Ok(vec![
                Locality {
                    id: LocalityId(2),
                    name: "Thirroul".to_owned(),
                },
                Locality {
                    id: LocalityId(1),
                    name: "Corrimal".to_owned(),
                },
            ])
        }

        async fn streets(&self, locality: LocalityId) -> Result<Vec<Street>, PortError> {
            Ok(vec![Street {
                id: StreetId(10),
                name: "Lawrence Hargrave Dr".to_owned(),
                locality_id: locality,
            }])
        }

        async fn properties(&self, street: StreetId) -> Result<Vec<Property>, PortError> {
            Ok(vec![
                Property {
                    id: PropertyId(101),
                    name: "12".to_owned(),
                    street_id: street,
                },
                Property {
                    id: PropertyId(100),
                    name: "10".to_owned(),
                    street_id: street,
                },
            ])
        }

        async fn materials(&self) -> Result<Vec<Material>, PortError> {
            Ok(vec![Material {
                title: "Pizza box".to_owned(),
                keywords: Some("cardboard".to_owned()),
                bin: MaterialBin::Recycle,
            }])
        }

        async fn events(&self) -> Result<Vec<MunicipalEvent>, PortError> {
            if !self.online {
                return Err(PortError::Status(StatusCode::BAD_GATEWAY));
            }
            Ok(vec![MunicipalEvent {
                title: "Repair cafe".to_owned(),
                start_date: Some(today() + Duration::days(3)),
            }])
        }
    }

    #[async_trait]
    impl SchedulePort for FakeMunicipality {
        async fn schedule(&self, _property: PropertyId) -> Result<BinSchedule, PortError> {
            if !self.online {
                return Err(PortError::Status(StatusCode::BAD_GATEWAY));
            }
            let mut schedule = BinSchedule::new();
            let next =
                NextCollection::on(today() + Duration::days(2), offset()).expect("valid date");
            schedule.insert(BinKind::Organic, next);
            Ok(schedule)
        }
    }

    #[async_trait]
    impl ForecastPort for FakeMunicipality {
        async fn daily(&self, days_ahead: u32) -> Result<WeatherSample, PortError> {
            Ok(WeatherSample {
                date: today() + Duration::days(i64::from(days_ahead)),
                rainfall_mm: 0.0,
                wind_kmh: 62.0,
                weather_code: None,
            })
        }
    }

    fn service(dir: &tempfile::TempDir, online: bool) -> BinDayService {
        let fake = Arc::new(FakeMunicipality { online });
        let plugin = MunicipalityPlugin {
            meta: MunicipalityMeta {
                id: "test".to_owned(),
                name: "Test".to_owned(),
            },
            reference_port: Arc::clone(&fake) as Arc<dyn ReferencePort>,
            schedule_port: Arc::clone(&fake) as Arc<dyn SchedulePort>,
            forecast_port: fake,
        };
        let config = EngineConfig::default().with_data_dir(dir.path());
        BinDayService::with_clock(plugin, &config, Arc::new(FixedClock(now())))
    }

    #[tokio::test]
    async fn setup_lists_are_sorted_and_config_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir, true);

        let names: Vec<String> = service
            .localities()
            .await
            .expect("localities")
            .into_iter()
            .map(|locality| locality.name)
            .collect();
        assert_eq!(names, vec!["Corrimal", "Thirroul"]);

        let properties = service.properties(StreetId(10)).await.expect("properties");
        assert_eq!(properties.first().map(|property| property.id), Some(PropertyId(100)));

        assert_eq!(service.now(), now());
        assert!(service.current_config().is_none());
        service.complete_setup(PropertyId(100)).expect("saved");
        let config = service.current_config().expect("setup done");
        assert_eq!(config.property_id, PropertyId(100));
        assert_eq!(config.setup_date, now());
    }

    #[tokio::test]
    async fn resolved_schedule_feeds_advisories_and_export() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir, true);

        let resolution = service.resolve(PropertyId(100)).await;
        assert_eq!(resolution.freshness, Freshness::Fresh);

        let advisories = service.advisories(&resolution.schedule).await;
        assert_eq!(advisories.len(), 1);

        let path = service.save_calendar(&resolution.schedule).expect("exported");
        let document = std::fs::read_to_string(path).expect("written");
        assert_eq!(document.matches("BEGIN:VEVENT").count(), 1);
    }

    #[tokio::test]
    async fn offline_service_degrades_gracefully() {
        let dir = tempfile::tempdir().expect("tempdir");

        service(&dir, true).resolve(PropertyId(100)).await;
        let offline = service(&dir, false);

        let resolution = offline.refresh(PropertyId(100)).await;
        assert_eq!(resolution.freshness, Freshness::Cached);
        assert!(resolution.error().is_none());
        assert!(offline.upcoming_event().await.is_none());
        assert!(matches!(
            offline.save_calendar(&BinSchedule::new()),
            Err(EngineError::ExportEmpty)
        ));
    }

    #[tokio::test]
    async fn which_bin_and_events_pass_through() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = service(&dir, true);

        assert_eq!(service.which_bin("CARD").await.expect("guide").len(), 1);
        assert_eq!(
            service.upcoming_event().await.map(|event| event.title),
            Some("Repair cafe".to_owned())
        );
    }
}
