//! Core types and engine wiring for the binday collection tracker.

/// Calendar export of resolved schedules.
pub mod calendar;
/// Injectable wall clock.
pub mod clock;
/// Engine configuration and defaults.
pub mod config;
/// Error taxonomy surfaced by the engine.
pub mod error;
/// Upcoming municipal events.
pub mod events;
/// Schedule synthesis from a weekly collection day.
pub mod fallback;
/// A-Z material lookup.
pub mod materials;
/// Domain models shared by the engine and providers.
pub mod model;
/// Provider bundle handed to the service.
pub mod plugin;
/// Traits describing the provider interfaces.
pub mod ports;
/// Cache/remote reconciliation.
pub mod resolver;
/// High-level service facade used by clients.
pub mod service;
/// Durable JSON stores for config and cached schedules.
pub mod store;
/// Forecast-driven advisories.
pub mod weather;

pub use error::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
