//! Ingestion jobs that populate the ticker registry and price table.
//!
//! Market capitalization for every stored price is `close * shares`, where
//! `shares` is the latest share count known to the registry. Historical share
//! counts are not available, so the current count is applied retroactively.

use crate::error::{DataError, Result};
use crate::model::PricePoint;
use crate::store::SqliteStore;
use crate::yahoo::{YahooProfileProvider, YahooQuoteProvider};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Symbols requested from the provider
    pub symbols_requested: usize,
    /// Tickers written to the registry
    pub tickers_registered: usize,
    /// Price rows built from the fetched closes
    pub rows_priced: usize,
    /// Price rows newly inserted (existing rows are never overwritten)
    pub rows_inserted: usize,
    /// Symbols with closes but no known share count
    pub unpriced: Vec<String>,
}

/// Ingestion parameters.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Calendar days of history fetched by [`bootstrap`]
    pub history_days: u32,
    /// Concurrent symbol fetches
    pub concurrency: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            history_days: 30,
            concurrency: crate::yahoo::quotes::DEFAULT_CONCURRENCY,
        }
    }
}

/// Symbols present in `closes` for which no share count is known.
pub fn unpriced_symbols(closes: &DataFrame, shares: &HashMap<String, u64>) -> Result<Vec<String>> {
    let symbols: BTreeSet<String> = closes
        .column("symbol")?
        .str()?
        .into_iter()
        .flatten()
        .filter(|s| !shares.contains_key(*s))
        .map(str::to_string)
        .collect();

    Ok(symbols.into_iter().collect())
}

/// Turn a `symbol, date, close` frame into price points, back-filling market
/// capitalization from the share counts. Rows without a share count are
/// dropped. Output is ordered by date, then symbol.
pub fn price_points_from_closes(
    closes: &DataFrame,
    shares: &HashMap<String, u64>,
) -> Result<Vec<PricePoint>> {
    let (symbols, counts): (Vec<&str>, Vec<f64>) = shares
        .iter()
        .map(|(symbol, count)| (symbol.as_str(), *count as f64))
        .unzip();

    let shares_df = DataFrame::new(vec![
        Series::new("symbol".into(), symbols).into(),
        Series::new("shares_outstanding".into(), counts).into(),
    ])?;

    let priced = closes
        .clone()
        .lazy()
        .join(
            shares_df.lazy(),
            [col("symbol")],
            [col("symbol")],
            JoinArgs::new(JoinType::Inner),
        )
        .with_column((col("close") * col("shares_outstanding")).alias("market_cap"))
        .sort(["date", "symbol"], SortMultipleOptions::default())
        .collect()?;

    let symbols = priced.column("symbol")?.str()?;
    let dates = priced.column("date")?.cast(&DataType::String)?;
    let dates = dates.str()?;
    let closes = priced.column("close")?.f64()?;
    let market_caps = priced.column("market_cap")?.f64()?;

    let mut points = Vec::with_capacity(priced.height());
    for i in 0..priced.height() {
        let symbol = symbols
            .get(i)
            .ok_or_else(|| DataError::Parse("Missing symbol".to_string()))?;
        let date = dates
            .get(i)
            .ok_or_else(|| DataError::Parse("Missing date".to_string()))?;
        let close = closes
            .get(i)
            .ok_or_else(|| DataError::Parse("Missing close".to_string()))?;
        let market_cap = market_caps
            .get(i)
            .ok_or_else(|| DataError::Parse("Missing market cap".to_string()))?;

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid date {}: {}", date, e)))?;

        points.push(PricePoint::new(symbol, date, close, market_cap));
    }

    Ok(points)
}

/// Price a frame of closes against the registry and store the result.
fn store_closes(store: &SqliteStore, closes: &DataFrame, summary: &mut IngestSummary) -> Result<()> {
    let shares = store.shares_outstanding()?;

    summary.unpriced = unpriced_symbols(closes, &shares)?;
    for symbol in &summary.unpriced {
        warn!(symbol = %symbol, "no shares outstanding known, skipping prices");
    }

    let points = price_points_from_closes(closes, &shares)?;
    summary.rows_priced = points.len();
    summary.rows_inserted = store.insert_prices(&points)?;
    Ok(())
}

/// One-time population of the registry and recent price history.
///
/// Registers every symbol the profile provider knows about, then fetches
/// `history_days` of closes ending at `end` (inclusive).
pub async fn bootstrap(
    store: &SqliteStore,
    profiles: &YahooProfileProvider,
    quotes: &YahooQuoteProvider,
    symbols: &[String],
    end: NaiveDate,
    options: IngestOptions,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary {
        symbols_requested: symbols.len(),
        ..IngestSummary::default()
    };

    let tickers: Vec<_> = profiles
        .fetch_profiles(symbols)
        .await?
        .into_iter()
        .map(|profile| profile.into_ticker())
        .collect();
    store.upsert_tickers(&tickers)?;
    summary.tickers_registered = tickers.len();
    info!(registered = tickers.len(), "ticker registry populated");

    let registered: Vec<String> = tickers.into_iter().map(|t| t.symbol).collect();
    let start = end - Duration::days(i64::from(options.history_days));
    let closes = quotes
        .fetch_closes_batch(&registered, start, end, options.concurrency)
        .await?;

    store_closes(store, &closes, &mut summary)?;
    info!(
        rows = summary.rows_inserted,
        start = %start,
        end = %end,
        "historical prices stored"
    );

    Ok(summary)
}

/// Nightly batch: fetch closes for every registered ticker on `run_date`.
///
/// A day without any data (weekend, holiday) is not an error; the summary
/// simply reports zero rows.
pub async fn daily_batch(
    store: &SqliteStore,
    quotes: &YahooQuoteProvider,
    run_date: NaiveDate,
    options: IngestOptions,
) -> Result<IngestSummary> {
    let symbols: Vec<String> = store
        .get_tickers()?
        .into_iter()
        .map(|t| t.symbol)
        .collect();

    let mut summary = IngestSummary {
        symbols_requested: symbols.len(),
        ..IngestSummary::default()
    };

    info!(date = %run_date, symbols = symbols.len(), "fetching daily prices");

    let closes = match quotes
        .fetch_closes_batch(&symbols, run_date, run_date, options.concurrency)
        .await
    {
        Ok(df) => df,
        Err(DataError::MissingData { .. }) => {
            info!(date = %run_date, "no data fetched, market closed");
            return Ok(summary);
        }
        Err(e) => return Err(e),
    };

    // Yahoo may return the previous session when the market is closed
    let closes = closes
        .lazy()
        .filter(col("date").cast(DataType::String).eq(lit(run_date.to_string())))
        .collect()?;

    store_closes(store, &closes, &mut summary)?;
    info!(date = %run_date, rows = summary.rows_inserted, "daily prices stored");

    Ok(summary)
}
