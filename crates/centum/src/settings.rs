//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. a TOML file (`centum.toml` in the working directory, or an explicit path)
//! 3. `CENTUM_*` environment variables, nested keys separated by `__`
//!    (e.g. `CENTUM_INDEX__MAX_CONSTITUENTS=50`)

use crate::error::{Error, Result};
use centum_index::MAX_CONSTITUENTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Index construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Number of constituents.
    pub max_constituents: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            max_constituents: MAX_CONSTITUENTS,
        }
    }
}

/// Ingestion parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Calendar days of history fetched at bootstrap.
    pub history_days: u32,
    /// Delay after each provider request, in milliseconds.
    pub rate_limit_ms: u64,
    /// Concurrent symbol fetches.
    pub concurrency: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            history_days: 30,
            rate_limit_ms: 250,
            concurrency: 8,
        }
    }
}

impl IngestSettings {
    /// Provider rate limit as a duration.
    pub const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// Options for the ingestion jobs.
    pub const fn options(&self) -> centum_data::IngestOptions {
        centum_data::IngestOptions {
            history_days: self.history_days,
            concurrency: self.concurrency,
        }
    }
}

/// Export parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory export files are written to.
    pub directory: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Index construction.
    pub index: IndexSettings,
    /// Ingestion.
    pub ingest: IngestSettings,
    /// Export.
    pub export: ExportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            index: IndexSettings::default(),
            ingest: IngestSettings::default(),
            export: ExportSettings::default(),
        }
    }
}

/// `<cache dir>/centum/centum.db`, falling back to the working directory.
pub fn default_database_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("centum")
        .join("centum.db")
}

impl Settings {
    /// Load settings from defaults, the TOML file and the environment.
    ///
    /// With `path` set the file must exist; otherwise `centum.toml` is read
    /// if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("centum").required(false),
        };

        let settings: Self = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("CENTUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.index.max_constituents == 0 {
            return Err(Error::InvalidSettings(
                "index.max_constituents must be positive".to_string(),
            ));
        }
        if self.ingest.concurrency == 0 {
            return Err(Error::InvalidSettings(
                "ingest.concurrency must be positive".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::InvalidSettings(
                "database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
