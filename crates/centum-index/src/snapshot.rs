//! Storage seams used by the engine.
//!
//! [`MarketSnapshot`] is the read-only view of ingested market data and
//! [`IndexLedger`] is where built days are recorded. Both are implemented for
//! [`SqliteStore`].

use crate::error::Result;
use centum_data::{
    BuildLock, ConstituentWeight, IndexDay, PerformanceRow, PricePoint, SqliteStore,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Per-date market data consumed by the builder.
pub trait MarketSnapshot {
    /// Price points recorded on `date`.
    fn prices_for_date(&self, date: NaiveDate) -> Result<Vec<PricePoint>>;

    /// Active tickers with a price on `date`.
    fn eligible_tickers(&self, date: NaiveDate) -> Result<BTreeSet<String>>;

    /// Dates in `[start, end]` with any market data, ascending.
    fn trading_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>>;
}

/// Persisted index history.
pub trait IndexLedger {
    /// Atomically replace composition and performance for one date.
    fn commit_day(&self, day: &IndexDay) -> Result<()>;

    /// Composition of a built date, `None` if never built.
    fn composition(&self, date: NaiveDate) -> Result<Option<Vec<ConstituentWeight>>>;

    /// Performance of a built date, `None` if never built.
    fn performance(&self, date: NaiveDate) -> Result<Option<PerformanceRow>>;

    /// Performance of built dates in `[start, end]`, ascending.
    fn performance_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PerformanceRow>>;

    /// Latest built date strictly before `date`.
    fn previous_built_date(&self, date: NaiveDate) -> Result<Option<NaiveDate>>;

    /// Built dates strictly after `date`, ascending.
    fn built_dates_after(&self, date: NaiveDate) -> Result<Vec<NaiveDate>>;

    /// Keep other builds off this ledger until the returned lock drops.
    /// Ledgers without shared writers return `None`.
    fn lock_builds(&self) -> Result<Option<BuildLock<'_>>> {
        Ok(None)
    }

    /// Built dates in `[start, end]`, ascending.
    fn built_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        Ok(self
            .performance_range(start, end)?
            .into_iter()
            .map(|row| row.date)
            .collect())
    }
}

impl MarketSnapshot for SqliteStore {
    fn prices_for_date(&self, date: NaiveDate) -> Result<Vec<PricePoint>> {
        Ok(Self::prices_for_date(self, date)?)
    }

    fn eligible_tickers(&self, date: NaiveDate) -> Result<BTreeSet<String>> {
        Ok(Self::eligible_tickers(self, date)?)
    }

    fn trading_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        Ok(self.price_dates(start, end)?)
    }
}

impl IndexLedger for SqliteStore {
    fn commit_day(&self, day: &IndexDay) -> Result<()> {
        Ok(self.commit_index_day(day)?)
    }

    fn composition(&self, date: NaiveDate) -> Result<Option<Vec<ConstituentWeight>>> {
        Ok(Self::composition(self, date)?)
    }

    fn performance(&self, date: NaiveDate) -> Result<Option<PerformanceRow>> {
        Ok(Self::performance(self, date)?)
    }

    fn performance_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PerformanceRow>> {
        Ok(Self::performance_range(self, start, end)?)
    }

    fn previous_built_date(&self, date: NaiveDate) -> Result<Option<NaiveDate>> {
        Ok(Self::previous_built_date(self, date)?)
    }

    fn built_dates_after(&self, date: NaiveDate) -> Result<Vec<NaiveDate>> {
        Ok(Self::built_dates_after(self, date)?)
    }

    fn lock_builds(&self) -> Result<Option<BuildLock<'_>>> {
        Ok(Some(self.build_lock()?))
    }

    fn built_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        Ok(Self::built_dates(self, start, end)?)
    }
}
