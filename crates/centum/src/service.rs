//! Index service over a shared store.

use crate::error::Result;
use crate::settings::Settings;
use centum_data::yahoo::{YahooProfileProvider, YahooQuoteProvider};
use centum_data::{
    ConstituentWeight, IngestSummary, PerformanceRow, SqliteStore, StoreStats, ingest,
};
use centum_index::{BuildPhase, BuildReport, CompositionChange, IndexBuilder, query};
use centum_output::{ExportFormat, IndexExport, PerformanceSummary};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Build, query and export operations on one index database.
///
/// The service is cheap to clone; clones share the store, so independent
/// builds can run from several threads.
#[derive(Debug, Clone)]
pub struct IndexService {
    store: Arc<SqliteStore>,
    settings: Settings,
}

impl IndexService {
    /// Open the database named in the settings, creating it if needed.
    pub fn open(settings: &Settings) -> Result<Self> {
        if let Some(parent) = settings.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(centum_data::DataError::from)?;
            }
        }

        let store = SqliteStore::new(&settings.database_path)?;
        info!(path = %settings.database_path.display(), "opened index database");
        Ok(Self::with_store(Arc::new(store), settings.clone()))
    }

    /// Wrap an existing store.
    pub const fn with_store(store: Arc<SqliteStore>, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// The underlying store.
    pub const fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    /// The active settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    fn builder(&self) -> IndexBuilder<'_, SqliteStore> {
        IndexBuilder::new(&*self.store)
            .with_max_constituents(self.settings.index.max_constituents)
    }

    /// Build the index for every trading date in `[start, end]`.
    pub fn build_index(&self, start: NaiveDate, end: NaiveDate) -> Result<BuildReport> {
        Ok(self.builder().build(start, end)?)
    }

    /// Build the index, reporting every phase transition to `observer`.
    pub fn build_index_with_observer<'a>(
        &'a self,
        start: NaiveDate,
        end: NaiveDate,
        observer: impl Fn(&BuildPhase) + Send + Sync + 'a,
    ) -> Result<BuildReport> {
        Ok(self.builder().with_observer(observer).build(start, end)?)
    }

    /// Composition of a built date, sorted by ticker.
    pub fn get_composition(&self, date: NaiveDate) -> Result<Vec<ConstituentWeight>> {
        Ok(query::composition(&*self.store, date)?)
    }

    /// Daily and cumulative returns of built dates in `[start, end]`.
    pub fn get_performance(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PerformanceRow>> {
        Ok(query::performance(&*self.store, start, end)?)
    }

    /// Entries and exits of built dates in `[start, end]`.
    pub fn get_composition_changes(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CompositionChange>> {
        Ok(query::composition_changes(&*self.store, start, end)?)
    }

    /// Summary statistics over `[start, end]`, `None` if nothing is built.
    pub fn performance_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<PerformanceSummary>> {
        let rows = self.get_performance(start, end)?;
        Ok(PerformanceSummary::from_rows(&rows))
    }

    /// Assemble the three export datasets for `[start, end]`.
    pub fn export(&self, start: NaiveDate, end: NaiveDate) -> Result<IndexExport> {
        let performance = self.get_performance(start, end)?;
        let changes: Vec<_> = self
            .get_composition_changes(start, end)?
            .into_iter()
            .filter(|change| !change.is_empty())
            .collect();
        let compositions = performance
            .iter()
            .map(|row| Ok((row.date, self.get_composition(row.date)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(IndexExport::new(
            start,
            end,
            &performance,
            &changes,
            &compositions,
        ))
    }

    /// Write an export to `dir`, or the configured export directory.
    pub fn export_to_dir(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        format: ExportFormat,
        dir: Option<&Path>,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.unwrap_or(&self.settings.export.directory);
        Ok(self.export(start, end)?.write_to_dir(dir, format)?)
    }

    /// Store statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(self.store.get_stats()?)
    }

    /// Register `symbols` and load their recent history up to `end`.
    pub async fn bootstrap(&self, symbols: &[String], end: NaiveDate) -> Result<IngestSummary> {
        let rate_limit = self.settings.ingest.rate_limit();
        let profiles = YahooProfileProvider::with_rate_limit(rate_limit)?;
        let quotes = YahooQuoteProvider::with_rate_limit(rate_limit)?;

        Ok(ingest::bootstrap(
            &self.store,
            &profiles,
            &quotes,
            symbols,
            end,
            self.settings.ingest.options(),
        )
        .await?)
    }

    /// Fetch closes for every registered ticker on `date`.
    pub async fn ingest_daily(&self, date: NaiveDate) -> Result<IngestSummary> {
        let quotes = YahooQuoteProvider::with_rate_limit(self.settings.ingest.rate_limit())?;
        Ok(ingest::daily_batch(&self.store, &quotes, date, self.settings.ingest.options()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use centum_data::{PricePoint, Ticker};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn service() -> IndexService {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert_tickers(&[Ticker::new("AAA"), Ticker::new("BBB")])
            .unwrap();
        store
            .insert_prices(&[
                PricePoint::new("AAA", d(2), 10.0, 20.0),
                PricePoint::new("BBB", d(2), 10.0, 10.0),
                PricePoint::new("AAA", d(3), 11.0, 22.0),
                PricePoint::new("BBB", d(3), 9.0, 9.0),
            ])
            .unwrap();
        IndexService::with_store(Arc::new(store), Settings::default())
    }

    #[test]
    fn test_build_and_query() {
        let service = service();
        let report = service.build_index(d(1), d(31)).unwrap();
        assert_eq!(report.dates_built, vec![d(2), d(3)]);

        assert_eq!(service.get_composition(d(3)).unwrap().len(), 2);
        let perf = service.get_performance(d(1), d(31)).unwrap();
        // 0.5 * 10% + 0.5 * -10%
        assert!(perf[1].daily_return.abs() < 1e-12);
    }

    #[test]
    fn test_configured_index_size() {
        let mut settings = Settings::default();
        settings.index.max_constituents = 1;
        let service = IndexService::with_store(Arc::clone(service().store()), settings);

        service.build_index(d(1), d(31)).unwrap();
        let composition = service.get_composition(d(2)).unwrap();
        assert_eq!(composition, vec![ConstituentWeight::new("AAA", 1.0)]);
    }

    #[test]
    fn test_export_skips_unchanged_dates() {
        let service = service();
        service.build_index(d(1), d(31)).unwrap();

        let export = service.export(d(1), d(31)).unwrap();
        assert_eq!(export.composition_changes.len(), 2);
        assert_eq!(export.daily_compositions.len(), 4);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            database_path: dir.path().join("nested").join("centum.db"),
            ..Settings::default()
        };

        let service = IndexService::open(&settings).unwrap();
        assert_eq!(service.stats().unwrap().tickers, 0);
        assert!(settings.database_path.exists());
    }
}
