//! Row types shared by the store, the ingestion jobs and the index engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A security in the ticker registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Ticker symbol (unique).
    pub symbol: String,
    /// Company name.
    pub company_name: Option<String>,
    /// Listing exchange.
    pub exchange: Option<String>,
    /// `false` for delisted or suspended instruments. History is kept.
    pub active: bool,
    /// Latest known shares outstanding.
    pub shares_outstanding: Option<u64>,
}

impl Ticker {
    /// Create an active ticker with no metadata.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: None,
            exchange: None,
            active: true,
            shares_outstanding: None,
        }
    }

    /// Set the company name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    /// Set the listing exchange.
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    /// Set the latest known share count.
    pub const fn with_shares(mut self, shares: u64) -> Self {
        self.shares_outstanding = Some(shares);
        self
    }

    /// Mark the ticker as inactive.
    pub const fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Closing price and market capitalization of one ticker on one trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Ticker symbol.
    pub ticker: String,
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub close_price: f64,
    /// Market capitalization (`close_price * latest shares outstanding`).
    pub market_cap: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub fn new(ticker: impl Into<String>, date: NaiveDate, close_price: f64, market_cap: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            close_price,
            market_cap,
        }
    }
}

/// One constituent row of an index composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentWeight {
    /// Ticker symbol.
    pub ticker: String,
    /// Portfolio weight (fraction, sums to 1.0 across a date).
    pub weight: f64,
}

impl ConstituentWeight {
    /// Create a new constituent weight.
    pub fn new(ticker: impl Into<String>, weight: f64) -> Self {
        Self {
            ticker: ticker.into(),
            weight,
        }
    }
}

/// Index performance on one built date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    /// Trading date.
    pub date: NaiveDate,
    /// Fractional daily return (0.01 = 1%).
    pub daily_return: f64,
    /// Compounded return since the first built date.
    pub cumulative_return: f64,
}

/// Everything the builder persists for a single date, committed as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDay {
    /// Trading date.
    pub date: NaiveDate,
    /// Constituents and their weights, sorted by ticker.
    pub constituents: Vec<ConstituentWeight>,
    /// Fractional daily return.
    pub daily_return: f64,
    /// Compounded return since the first built date.
    pub cumulative_return: f64,
}

impl IndexDay {
    /// The performance row for this date.
    pub const fn performance(&self) -> PerformanceRow {
        PerformanceRow {
            date: self.date,
            daily_return: self.daily_return,
            cumulative_return: self.cumulative_return,
        }
    }

    /// Sum of all constituent weights.
    pub fn total_weight(&self) -> f64 {
        self.constituents.iter().map(|c| c.weight).sum()
    }
}
