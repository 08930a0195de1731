//! Daily close fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

/// Default number of concurrent symbol fetches.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider with the default rate limit (250ms between requests).
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(250))
    }

    /// Create a provider with a custom delay after each request.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch daily closes for a single symbol over `[start, end]`.
    ///
    /// # Returns
    /// A Polars DataFrame with columns: symbol, date, close
    pub async fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DataFrame> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        // Yahoo treats the end bound as exclusive
        let start_time = to_offset_datetime(start)?;
        let end_time = to_offset_datetime(end.succ_opt().unwrap_or(end))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let timestamps: Vec<i64> = quotes.iter().map(|q| q.timestamp as i64).collect();
        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();

        let mut df = DataFrame::new(vec![
            Series::new("timestamp".into(), timestamps).into(),
            Series::new("close".into(), closes).into(),
        ])?;

        let symbol_col: Column = Series::new("symbol".into(), vec![symbol; df.height()]).into();
        df.with_column(symbol_col)?;

        let df = df
            .lazy()
            .with_column(
                (col("timestamp") * lit(1_000_000_000))
                    .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .filter(col("close").is_not_null().and(col("close").gt(lit(0.0))))
            .select(&[col("symbol"), col("date"), col("close")])
            .collect()?;

        sleep(self.rate_limit_delay).await;

        Ok(df)
    }

    /// Fetch daily closes for many symbols with bounded concurrency.
    ///
    /// Symbols that fail are logged and skipped. Fails only when nothing at all
    /// could be fetched.
    pub async fn fetch_closes_batch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        concurrency: usize,
    ) -> Result<DataFrame> {
        let frames: Vec<LazyFrame> = stream::iter(symbols)
            .map(|symbol| async move {
                match self.fetch_closes(symbol, start, end).await {
                    Ok(df) => {
                        debug!(symbol = %symbol, rows = df.height(), "fetched closes");
                        Some(df.lazy())
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "failed to fetch closes");
                        None
                    }
                }
            })
            .buffer_unordered(concurrency.max(1))
            .filter_map(|frame| async move { frame })
            .collect()
            .await;

        if frames.is_empty() {
            return Err(DataError::MissingData {
                symbol: "batch".to_string(),
                reason: "No data fetched for any symbol".to_string(),
            });
        }

        let combined = concat(frames, UnionArgs::default())?.collect()?;

        Ok(combined)
    }
}

fn to_offset_datetime(date: NaiveDate) -> Result<time::OffsetDateTime> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DataError::TimeConversion(format!("Invalid date: {}", date)))?
        .and_utc()
        .timestamp();

    time::OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::TimeConversion(e.to_string()))
}
