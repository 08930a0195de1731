//! Top-level error type.

use thiserror::Error;

/// Result type for the facade.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the service and settings layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidSettings(String),

    /// Store or provider failure.
    #[error(transparent)]
    Data(#[from] centum_data::DataError),

    /// Index construction or query failure.
    #[error(transparent)]
    Index(#[from] centum_index::IndexError),

    /// Export failure.
    #[error(transparent)]
    Export(#[from] centum_output::ExportError),
}
