//! Durable JSON files for the setup record and the last resolved schedule.
//!
//! Both stores are single small files rewritten wholesale. Writes go to a sibling
//! temporary file which is then renamed over the target, so a crash never leaves a
//! half-written record behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{BinSchedule, PropertyId};

#[derive(thiserror::Error, Debug)]
/// Errors raised while reading or writing a store file.
pub enum StoreError {
    /// The file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file content is not the expected JSON.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Persisted outcome of the setup flow.
pub struct ConfigRecord {
    /// Property whose schedule is tracked.
    pub property_id: PropertyId,
    /// Whether setup ran to completion.
    pub setup_completed: bool,
    /// When setup was completed.
    pub setup_date: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Last schedule fetched from the upstream.
pub struct CacheRecord {
    /// Schedule as resolved at fetch time.
    pub schedule: BinSchedule,
    /// When the schedule was fetched.
    pub cached_at: DateTime<FixedOffset>,
}

/// Storage for the last successfully resolved schedule.
pub trait ScheduleCache: Send + Sync {
    /// Read the cached record, `None` when nothing was cached yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<CacheRecord>, StoreError>;

    /// Replace the cached record.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the store cannot be written.
    fn save(&self, record: &CacheRecord) -> Result<(), StoreError>;
}

/// [`ScheduleCache`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileScheduleCache {
    path: PathBuf,
}

impl FileScheduleCache {
    /// Cache stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScheduleCache for FileScheduleCache {
    fn load(&self) -> Result<Option<CacheRecord>, StoreError> {
        read_json(&self.path)
    }

    fn save(&self, record: &CacheRecord) -> Result<(), StoreError> {
        write_json(&self.path, record)
    }
}

/// Store for the [`ConfigRecord`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Config stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the setup record, `None` when setup never ran.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the file exists but cannot be read or decoded.
    pub fn load(&self) -> Result<Option<ConfigRecord>, StoreError> {
        read_json(&self.path)
    }

    /// Overwrite the setup record.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the file cannot be written.
    pub fn save(&self, record: &ConfigRecord) -> Result<(), StoreError> {
        write_json(&self.path, record)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_owned(),
                source,
            });
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_owned(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_owned(),
        source,
    })?;
    write_atomic(path, body.as_bytes())
}

/// Replace the file at `path` with `contents` via a sibling temporary file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] when the directory or file cannot be written.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}
