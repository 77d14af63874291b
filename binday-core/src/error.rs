//! Engine-level error taxonomy.

use crate::ports::PortError;
use crate::store::StoreError;

#[derive(thiserror::Error, Debug)]
/// Failures the engine can report to its callers.
///
/// Only [`EngineError::NoData`] and [`EngineError::ExportEmpty`] are meant for end users;
/// everything else degrades to cached or empty results and is logged.
pub enum EngineError {
    /// Timeout or connection failure.
    #[error("Transport error: {0}")]
    Transport(String),
    /// Non-success status or malformed body from an upstream service.
    #[error("Upstream error: {0}")]
    Upstream(String),
    /// Config or cache store could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
    /// Neither fresh nor cached data is available.
    #[error("No internet and no cached data")]
    NoData,
    /// Calendar export requested but no bin has a date.
    #[error("No collection dates to export")]
    ExportEmpty,
}

impl From<PortError> for EngineError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Transport(source) => EngineError::Transport(source.to_string()),
            other => EngineError::Upstream(other.to_string()),
        }
    }
}
