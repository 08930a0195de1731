//! Store location and settings resolution for the CLI.
//!
//! Settings come from `centum.toml` and `CENTUM_*` variables; command-line
//! flags override individual values before the store is opened.

use centum::{IndexService, Settings};
use centum_data::StoreStats;
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of the loaded settings.
#[derive(Debug, Default, Clone)]
pub(crate) struct Overrides {
    pub(crate) database_path: Option<PathBuf>,
    pub(crate) max_constituents: Option<usize>,
}

/// Load settings and apply the overrides.
pub(crate) fn resolve_settings(
    config_path: Option<&Path>,
    overrides: Overrides,
) -> centum::Result<Settings> {
    let mut settings = Settings::load(config_path)?;

    if let Some(path) = overrides.database_path {
        settings.database_path = path;
    }
    if let Some(n) = overrides.max_constituents {
        settings.index.max_constituents = n;
    }

    settings.validate()?;
    Ok(settings)
}

/// Open the store, creating its directory if needed.
pub(crate) fn open_service(settings: &Settings) -> centum::Result<IndexService> {
    IndexService::open(settings)
}

/// Print where the store lives and what it holds.
pub(crate) fn print_store_info(settings: &Settings, stats: &StoreStats) {
    println!("  Database: {}", settings.database_path.display());
    println!(
        "  Tickers:  {} ({} active)",
        stats.tickers, stats.active_tickers
    );
    println!(
        "  Prices:   {} rows over {} dates",
        stats.price_rows, stats.price_dates
    );
    match (stats.first_built, stats.last_built) {
        (Some(first), Some(last)) => println!(
            "  Index:    {} dates built, {} to {} ({} composition rows)",
            stats.built_dates, first, last, stats.composition_rows
        ),
        _ => println!("  Index:    not built"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("centum.toml");
        let mut file = std::fs::File::create(&config).unwrap();
        writeln!(file, "[index]\nmax_constituents = 50").unwrap();

        let db = dir.path().join("override.db");
        let settings = resolve_settings(
            Some(&config),
            Overrides {
                database_path: Some(db.clone()),
                max_constituents: Some(10),
            },
        )
        .unwrap();

        assert_eq!(settings.database_path, db);
        assert_eq!(settings.index.max_constituents, 10);
    }

    #[test]
    fn test_zero_constituents_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("centum.toml");
        std::fs::File::create(&config).unwrap();

        let result = resolve_settings(
            Some(&config),
            Overrides {
                database_path: None,
                max_constituents: Some(0),
            },
        );
        assert!(result.is_err());
    }
}
