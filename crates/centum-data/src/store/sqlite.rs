//! SQLite store for tickers, prices and the built index.
//!
//! The store owns a single connection behind a mutex, so it can be shared
//! between threads through an `Arc`. Every write that must be observed as a
//! unit runs inside an `IMMEDIATE` transaction, which also serializes writers
//! coming from other processes on the same database file.

use crate::error::{DataError, Result};
use crate::model::{ConstituentWeight, IndexDay, PerformanceRow, PricePoint, Ticker};
use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    builds: Mutex<()>,
}

/// Exclusive right to rebuild the index of a store, released on drop.
#[derive(Debug)]
pub struct BuildLock<'a> {
    _guard: MutexGuard<'a, ()>,
}

fn parse_date(idx: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            builds: Mutex::new(()),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DataError::LockPoisoned)
    }

    /// Serialize index builds sharing this store.
    ///
    /// A build reads the return chain it extends; two builds must not
    /// interleave.
    pub fn build_lock(&self) -> Result<BuildLock<'_>> {
        let guard = self.builds.lock().map_err(|_| DataError::LockPoisoned)?;
        Ok(BuildLock { _guard: guard })
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS tickers (
                ticker TEXT PRIMARY KEY,
                company_name TEXT,
                exchange TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                shares_outstanding INTEGER,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS prices (
                date TEXT NOT NULL,
                ticker TEXT NOT NULL REFERENCES tickers(ticker),
                close_price REAL NOT NULL,
                market_cap REAL NOT NULL,
                PRIMARY KEY (date, ticker)
            );

            CREATE INDEX IF NOT EXISTS idx_prices_ticker ON prices(ticker);

            CREATE TABLE IF NOT EXISTS index_composition (
                date TEXT NOT NULL,
                ticker TEXT NOT NULL REFERENCES tickers(ticker),
                weight REAL NOT NULL,
                PRIMARY KEY (date, ticker)
            );

            CREATE TABLE IF NOT EXISTS index_performance (
                date TEXT PRIMARY KEY,
                daily_return REAL NOT NULL,
                cumulative_return REAL NOT NULL,
                built_at TEXT NOT NULL
            );",
        )?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Ticker registry
    // ------------------------------------------------------------------

    /// Insert a ticker, or update its metadata if it already exists.
    pub fn upsert_ticker(&self, ticker: &Ticker) -> Result<()> {
        self.upsert_tickers(std::slice::from_ref(ticker))
    }

    /// Insert or update several tickers in one transaction.
    pub fn upsert_tickers(&self, tickers: &[Ticker]) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO tickers
                 (ticker, company_name, exchange, active, shares_outstanding, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (ticker) DO UPDATE SET
                    company_name = excluded.company_name,
                    exchange = excluded.exchange,
                    active = excluded.active,
                    shares_outstanding = excluded.shares_outstanding,
                    updated_at = excluded.updated_at",
            )?;

            for ticker in tickers {
                if ticker.symbol.is_empty() {
                    return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
                }
                stmt.execute(params![
                    ticker.symbol,
                    ticker.company_name,
                    ticker.exchange,
                    ticker.active,
                    ticker.shares_outstanding.map(|s| s as i64),
                    updated_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a ticker by symbol.
    pub fn get_ticker(&self, symbol: &str) -> Result<Option<Ticker>> {
        let conn = self.lock()?;
        let ticker = conn
            .query_row(
                "SELECT ticker, company_name, exchange, active, shares_outstanding
                 FROM tickers WHERE ticker = ?1",
                params![symbol],
                |row| {
                    Ok(Ticker {
                        symbol: row.get(0)?,
                        company_name: row.get(1)?,
                        exchange: row.get(2)?,
                        active: row.get(3)?,
                        shares_outstanding: row.get::<_, Option<i64>>(4)?.map(|s| s as u64),
                    })
                },
            )
            .optional()?;

        Ok(ticker)
    }

    /// Get every registered ticker, ordered by symbol.
    pub fn get_tickers(&self) -> Result<Vec<Ticker>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT ticker, company_name, exchange, active, shares_outstanding
             FROM tickers ORDER BY ticker",
        )?;

        let tickers = stmt
            .query_map([], |row| {
                Ok(Ticker {
                    symbol: row.get(0)?,
                    company_name: row.get(1)?,
                    exchange: row.get(2)?,
                    active: row.get(3)?,
                    shares_outstanding: row.get::<_, Option<i64>>(4)?.map(|s| s as u64),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickers)
    }

    /// Flip the active flag of a ticker. History is never deleted.
    pub fn set_active(&self, symbol: &str, active: bool) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE tickers SET active = ?2, updated_at = ?3 WHERE ticker = ?1",
            params![symbol, active, Utc::now().to_rfc3339()],
        )?;

        if changed == 0 {
            return Err(DataError::UnknownTicker(symbol.to_string()));
        }
        Ok(())
    }

    /// Latest known share counts for every ticker that has one.
    pub fn shares_outstanding(&self) -> Result<HashMap<String, u64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT ticker, shares_outstanding FROM tickers
             WHERE shares_outstanding IS NOT NULL AND shares_outstanding > 0",
        )?;

        let shares = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;

        Ok(shares)
    }

    // ------------------------------------------------------------------
    // Prices
    // ------------------------------------------------------------------

    /// Store price points. Rows that already exist for a (ticker, date) are
    /// left untouched. Returns the number of rows actually inserted.
    pub fn insert_prices(&self, prices: &[PricePoint]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let known: HashSet<String> = {
            let mut stmt = tx.prepare("SELECT ticker FROM tickers")?;
            stmt.query_map([], |row| row.get(0))?
                .collect::<std::result::Result<HashSet<String>, _>>()?
        };

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO prices (date, ticker, close_price, market_cap)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;

            for price in prices {
                if !known.contains(&price.ticker) {
                    return Err(DataError::UnknownTicker(price.ticker.clone()));
                }
                inserted += stmt.execute(params![
                    price.date.to_string(),
                    price.ticker,
                    price.close_price,
                    price.market_cap,
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    /// All price points recorded on a date, ordered by ticker.
    pub fn prices_for_date(&self, date: NaiveDate) -> Result<Vec<PricePoint>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT ticker, close_price, market_cap FROM prices
             WHERE date = ?1 ORDER BY ticker",
        )?;

        let prices = stmt
            .query_map(params![date.to_string()], |row| {
                Ok(PricePoint {
                    ticker: row.get(0)?,
                    date,
                    close_price: row.get(1)?,
                    market_cap: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(prices)
    }

    /// Active tickers that have a price on the given date.
    pub fn eligible_tickers(&self, date: NaiveDate) -> Result<BTreeSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT p.ticker FROM prices p
             JOIN tickers t ON t.ticker = p.ticker
             WHERE p.date = ?1 AND t.active = 1",
        )?;

        let tickers = stmt
            .query_map(params![date.to_string()], |row| row.get(0))?
            .collect::<std::result::Result<BTreeSet<String>, _>>()?;

        Ok(tickers)
    }

    /// Closing price of a ticker on a date.
    pub fn close_price(&self, ticker: &str, date: NaiveDate) -> Result<Option<f64>> {
        let conn = self.lock()?;
        let close = conn
            .query_row(
                "SELECT close_price FROM prices WHERE ticker = ?1 AND date = ?2",
                params![ticker, date.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(close)
    }

    /// Distinct dates with at least one price in `[start, end]`, ascending.
    pub fn price_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT date FROM prices
             WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;

        let dates = stmt
            .query_map(params![start.to_string(), end.to_string()], |row| {
                parse_date(0, &row.get::<_, String>(0)?)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(dates)
    }

    // ------------------------------------------------------------------
    // Index tables
    // ------------------------------------------------------------------

    /// Persist composition and performance for one date atomically.
    ///
    /// Existing rows for the date are replaced, so rebuilding a date never
    /// accumulates duplicates.
    pub fn commit_index_day(&self, day: &IndexDay) -> Result<()> {
        let date = day.date.to_string();
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM index_composition WHERE date = ?1",
            params![date],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO index_composition (date, ticker, weight) VALUES (?1, ?2, ?3)",
            )?;
            for constituent in &day.constituents {
                stmt.execute(params![date, constituent.ticker, constituent.weight])?;
            }
        }

        tx.execute(
            "INSERT INTO index_performance (date, daily_return, cumulative_return, built_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (date) DO UPDATE SET
                daily_return = excluded.daily_return,
                cumulative_return = excluded.cumulative_return,
                built_at = excluded.built_at",
            params![
                date,
                day.daily_return,
                day.cumulative_return,
                Utc::now().to_rfc3339()
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Composition of a built date ordered by ticker, or `None` if the date
    /// was never built.
    pub fn composition(&self, date: NaiveDate) -> Result<Option<Vec<ConstituentWeight>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT ticker, weight FROM index_composition
             WHERE date = ?1 ORDER BY ticker",
        )?;

        let rows = stmt
            .query_map(params![date.to_string()], |row| {
                Ok(ConstituentWeight {
                    ticker: row.get(0)?,
                    weight: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok((!rows.is_empty()).then_some(rows))
    }

    /// Performance row of a built date.
    pub fn performance(&self, date: NaiveDate) -> Result<Option<PerformanceRow>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT daily_return, cumulative_return FROM index_performance WHERE date = ?1",
                params![date.to_string()],
                |row| {
                    Ok(PerformanceRow {
                        date,
                        daily_return: row.get(0)?,
                        cumulative_return: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(row)
    }

    /// Performance rows for built dates in `[start, end]`, ascending.
    pub fn performance_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PerformanceRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT date, daily_return, cumulative_return FROM index_performance
             WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;

        let rows = stmt
            .query_map(params![start.to_string(), end.to_string()], |row| {
                Ok(PerformanceRow {
                    date: parse_date(0, &row.get::<_, String>(0)?)?,
                    daily_return: row.get(1)?,
                    cumulative_return: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Built dates in `[start, end]`, ascending.
    pub fn built_dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        Ok(self
            .performance_range(start, end)?
            .into_iter()
            .map(|row| row.date)
            .collect())
    }

    /// Latest built date strictly before `date`.
    pub fn previous_built_date(&self, date: NaiveDate) -> Result<Option<NaiveDate>> {
        let conn = self.lock()?;
        let value: Option<String> = conn.query_row(
            "SELECT MAX(date) FROM index_performance WHERE date < ?1",
            params![date.to_string()],
            |row| row.get(0),
        )?;

        Ok(value.map(|v| parse_date(0, &v)).transpose()?)
    }

    /// Built dates strictly after `date`, ascending.
    pub fn built_dates_after(&self, date: NaiveDate) -> Result<Vec<NaiveDate>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT date FROM index_performance WHERE date > ?1 ORDER BY date")?;

        let dates = stmt
            .query_map(params![date.to_string()], |row| {
                parse_date(0, &row.get::<_, String>(0)?)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(dates)
    }

    /// Earliest built date in the store.
    pub fn first_built_date(&self) -> Result<Option<NaiveDate>> {
        let conn = self.lock()?;
        let value: Option<String> =
            conn.query_row("SELECT MIN(date) FROM index_performance", [], |row| {
                row.get(0)
            })?;

        Ok(value.map(|v| parse_date(0, &v)).transpose()?)
    }

    /// Delete every built composition and performance row.
    pub fn clear_index(&self) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM index_composition", [])?;
        tx.execute("DELETE FROM index_performance", [])?;
        tx.commit()?;
        Ok(())
    }

    /// Get store statistics.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let (first_built, last_built) = {
            let conn = self.lock()?;
            let bounds: (Option<String>, Option<String>) = conn.query_row(
                "SELECT MIN(date), MAX(date) FROM index_performance",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            bounds
        };

        let conn = self.lock()?;
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            tickers: count("SELECT COUNT(*) FROM tickers")?,
            active_tickers: count("SELECT COUNT(*) FROM tickers WHERE active = 1")?,
            price_rows: count("SELECT COUNT(*) FROM prices")?,
            price_dates: count("SELECT COUNT(DISTINCT date) FROM prices")?,
            built_dates: count("SELECT COUNT(*) FROM index_performance")?,
            composition_rows: count("SELECT COUNT(*) FROM index_composition")?,
            first_built: first_built.map(|v| parse_date(0, &v)).transpose()?,
            last_built: last_built.map(|v| parse_date(0, &v)).transpose()?,
        })
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Registered tickers
    pub tickers: usize,
    /// Registered tickers flagged active
    pub active_tickers: usize,
    /// Total price rows
    pub price_rows: usize,
    /// Distinct dates with prices
    pub price_dates: usize,
    /// Dates with a built index
    pub built_dates: usize,
    /// Total composition rows
    pub composition_rows: usize,
    /// Earliest built date
    pub first_built: Option<NaiveDate>,
    /// Latest built date
    pub last_built: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert_tickers(&[
                Ticker::new("AAA").with_shares(10),
                Ticker::new("BBB").with_shares(20),
                Ticker::new("CCC"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_upsert_and_get_ticker() {
        let store = seeded_store();

        let aaa = store.get_ticker("AAA").unwrap().unwrap();
        assert!(aaa.active);
        assert_eq!(aaa.shares_outstanding, Some(10));

        store
            .upsert_ticker(&Ticker::new("AAA").with_name("Triple A").with_shares(12))
            .unwrap();
        let aaa = store.get_ticker("AAA").unwrap().unwrap();
        assert_eq!(aaa.company_name.as_deref(), Some("Triple A"));
        assert_eq!(aaa.shares_outstanding, Some(12));

        assert!(store.get_ticker("ZZZ").unwrap().is_none());
        assert_eq!(store.get_tickers().unwrap().len(), 3);
    }

    #[test]
    fn test_shares_outstanding_skips_unknown_counts() {
        let store = seeded_store();
        let shares = store.shares_outstanding().unwrap();

        assert_eq!(shares.len(), 2);
        assert_eq!(shares.get("BBB"), Some(&20));
        assert!(!shares.contains_key("CCC"));
    }

    #[test]
    fn test_prices_are_immutable() {
        let store = seeded_store();

        let inserted = store
            .insert_prices(&[PricePoint::new("AAA", d(1), 100.0, 1000.0)])
            .unwrap();
        assert_eq!(inserted, 1);

        let inserted = store
            .insert_prices(&[PricePoint::new("AAA", d(1), 999.0, 9990.0)])
            .unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.close_price("AAA", d(1)).unwrap(), Some(100.0));
    }

    #[test]
    fn test_insert_prices_rejects_unknown_ticker() {
        let store = seeded_store();
        let result = store.insert_prices(&[PricePoint::new("ZZZ", d(1), 1.0, 1.0)]);
        assert!(matches!(result, Err(DataError::UnknownTicker(_))));
    }

    #[test]
    fn test_eligible_tickers_excludes_inactive() {
        let store = seeded_store();
        store
            .insert_prices(&[
                PricePoint::new("AAA", d(2), 10.0, 100.0),
                PricePoint::new("BBB", d(2), 10.0, 200.0),
            ])
            .unwrap();
        store.set_active("BBB", false).unwrap();

        let eligible = store.eligible_tickers(d(2)).unwrap();
        assert_eq!(eligible.into_iter().collect::<Vec<_>>(), vec!["AAA"]);

        // Prices stay readable for inactive tickers
        assert_eq!(store.prices_for_date(d(2)).unwrap().len(), 2);
        assert!(matches!(
            store.set_active("ZZZ", false),
            Err(DataError::UnknownTicker(_))
        ));
    }

    #[test]
    fn test_price_dates() {
        let store = seeded_store();
        store
            .insert_prices(&[
                PricePoint::new("AAA", d(3), 1.0, 1.0),
                PricePoint::new("BBB", d(3), 1.0, 1.0),
                PricePoint::new("AAA", d(6), 1.0, 1.0),
            ])
            .unwrap();

        assert_eq!(store.price_dates(d(1), d(31)).unwrap(), vec![d(3), d(6)]);
        assert_eq!(store.price_dates(d(4), d(5)).unwrap(), Vec::<NaiveDate>::new());
        assert!(matches!(
            store.price_dates(d(6), d(3)),
            Err(DataError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_commit_index_day_replaces_rows() {
        let store = seeded_store();
        let first = IndexDay {
            date: d(2),
            constituents: vec![
                ConstituentWeight::new("AAA", 0.5),
                ConstituentWeight::new("BBB", 0.5),
            ],
            daily_return: 0.0,
            cumulative_return: 0.0,
        };
        store.commit_index_day(&first).unwrap();

        let rebuilt = IndexDay {
            date: d(2),
            constituents: vec![ConstituentWeight::new("CCC", 1.0)],
            daily_return: 0.01,
            cumulative_return: 0.01,
        };
        store.commit_index_day(&rebuilt).unwrap();

        let composition = store.composition(d(2)).unwrap().unwrap();
        assert_eq!(composition, vec![ConstituentWeight::new("CCC", 1.0)]);

        let perf = store.performance(d(2)).unwrap().unwrap();
        assert_eq!(perf.daily_return, 0.01);
        assert_eq!(store.get_stats().unwrap().composition_rows, 1);
    }

    #[test]
    fn test_commit_rolls_back_on_failure() {
        let store = seeded_store();
        let bad = IndexDay {
            date: d(2),
            constituents: vec![
                ConstituentWeight::new("AAA", 0.5),
                ConstituentWeight::new("NOPE", 0.5),
            ],
            daily_return: 0.0,
            cumulative_return: 0.0,
        };

        assert!(store.commit_index_day(&bad).is_err());
        assert!(store.composition(d(2)).unwrap().is_none());
        assert!(store.performance(d(2)).unwrap().is_none());
    }

    #[test]
    fn test_build_lock_is_exclusive() {
        let store = seeded_store();
        let held = store.build_lock().unwrap();
        assert!(store.builds.try_lock().is_err());
        drop(held);
        assert!(store.build_lock().is_ok());
    }

    #[test]
    fn test_built_date_navigation() {
        let store = seeded_store();
        for day in [2, 3, 7] {
            store
                .commit_index_day(&IndexDay {
                    date: d(day),
                    constituents: vec![ConstituentWeight::new("AAA", 1.0)],
                    daily_return: 0.0,
                    cumulative_return: 0.0,
                })
                .unwrap();
        }

        assert_eq!(store.previous_built_date(d(7)).unwrap(), Some(d(3)));
        assert_eq!(store.previous_built_date(d(5)).unwrap(), Some(d(3)));
        assert_eq!(store.previous_built_date(d(2)).unwrap(), None);
        assert_eq!(store.first_built_date().unwrap(), Some(d(2)));
        assert_eq!(store.built_dates(d(3), d(31)).unwrap(), vec![d(3), d(7)]);
        assert_eq!(store.built_dates_after(d(2)).unwrap(), vec![d(3), d(7)]);
        assert!(store.built_dates_after(d(7)).unwrap().is_empty());

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.built_dates, 3);
        assert_eq!(stats.first_built, Some(d(2)));
        assert_eq!(stats.last_built, Some(d(7)));

        store.clear_index().unwrap();
        assert_eq!(store.first_built_date().unwrap(), None);
    }

    #[test]
    fn test_on_disk_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("centum.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.upsert_ticker(&Ticker::new("AAA")).unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert!(store.get_ticker("AAA").unwrap().is_some());
    }
}
