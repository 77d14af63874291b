//! Reconciles the remote schedule with the persisted cache.
//!
//! The cache is only ever replaced by a fresh, non-empty schedule. Failures leave it
//! untouched, so once one fetch succeeded a property always has something to show.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::model::{Freshness, PropertyId, Resolution};
use crate::ports::SchedulePort;
use crate::store::{CacheRecord, ScheduleCache};

struct LastFetch {
    property: PropertyId,
    resolution: Resolution,
}

/// Resolves the current schedule for a property from remote and cached data.
pub struct ScheduleResolver {
    schedule_port: Arc<dyn SchedulePort>,
    cache: Arc<dyn ScheduleCache>,
    clock: Arc<dyn Clock>,
    // Held for the whole remote branch so only one fetch is ever in flight.
    in_flight: Mutex<Option<LastFetch>>,
    completed: AtomicU64,
}

impl ScheduleResolver {
    /// Create a resolver over the given remote source and cache.
    #[must_use]
    pub fn new(
        schedule_port: Arc<dyn SchedulePort>,
        cache: Arc<dyn ScheduleCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schedule_port,
            cache,
            clock,
            in_flight: Mutex::new(None),
            completed: AtomicU64::new(0),
        }
    }

    /// Cached schedule, if any, for showing something before the network answers.
    #[must_use]
    pub fn warm_start(&self) -> Option<Resolution> {
        self.cached()
    }

    /// Remote fetch with cache fallback; returns the final outcome.
    ///
    /// Callers paint [`warm_start`](Self::warm_start) first and replace it with this result.
    pub async fn resolve(&self, property: PropertyId) -> Resolution {
        debug!(%property, "resolving schedule");
        self.refresh(property).await
    }

    /// Fetch the schedule again, falling back to the cache on failure.
    ///
    /// A call that waited while another fetch for the same property finished returns that
    /// fetch's result instead of hitting the network again.
    pub async fn refresh(&self, property: PropertyId) -> Resolution {
        let ticket = self.completed.load(Ordering::Acquire);
        let mut last = self.in_flight.lock().await;

        if self.completed.load(Ordering::Acquire) != ticket
            && let Some(done) = last.as_ref()
            && done.property == property
        {
            debug!(%property, "coalesced with the refresh that just finished");
            return done.resolution.clone();
        }

        let resolution = self.fetch(property).await;

        *last = Some(LastFetch {
            property,
            resolution: resolution.clone(),
        });
        self.completed.fetch_add(1, Ordering::AcqRel);

        resolution
    }

    async fn fetch(&self, property: PropertyId) -> Resolution {
        match self.schedule_port.schedule(property).await {
            Ok(schedule) if !schedule.is_empty() => {
                let record = CacheRecord {
                    schedule,
                    cached_at: self.clock.now(),
                };
                if let Err(err) = self.cache.save(&record) {
                    warn!(error = %err, "failed to persist schedule cache");
                }
                info!(%property, bins = record.schedule.len(), "schedule refreshed");
                Resolution {
                    schedule: record.schedule,
                    freshness: Freshness::Fresh,
                    cached_at: Some(record.cached_at),
                }
            }
            Ok(_) => {
                warn!(%property, "upstream returned no collections");
                self.cached().unwrap_or_else(Resolution::unavailable)
            }
            Err(err) => {
                warn!(%property, error = %err, "schedule fetch failed");
                self.cached().unwrap_or_else(Resolution::unavailable)
            }
        }
    }

    fn cached(&self) -> Option<Resolution> {
        match self.cache.load() {
            Ok(record) => record.map(|record| Resolution {
                schedule: record.schedule,
                freshness: Freshness::Cached,
                cached_at: Some(record.cached_at),
            }),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable schedule cache");
                None
            }
        }
    }
}
