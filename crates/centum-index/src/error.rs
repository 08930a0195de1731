//! Error types for index construction and queries.

use centum_data::DataError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while building or querying the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The date has market data but no eligible ticker.
    #[error("No eligible tickers on {date}")]
    DataGap {
        /// Date that could not be ranked
        date: NaiveDate,
    },

    /// Start of a range lies after its end.
    #[error("Invalid date range: {start} is after {end}")]
    Range {
        /// Range start
        start: NaiveDate,
        /// Range end
        end: NaiveDate,
    },

    /// The index was never built for the date.
    #[error("Index not built for {date}")]
    NotFound {
        /// Requested date
        date: NaiveDate,
    },

    /// Underlying store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] DataError),
}

impl IndexError {
    /// Whether the error only affects a single date of a build.
    pub const fn is_per_date(&self) -> bool {
        matches!(self, Self::DataGap { .. })
    }
}

/// A constituent whose return could not be computed on a date.
///
/// The constituent is left out of that day's return; its weight is not
/// redistributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDataWarning {
    /// Date whose return is affected
    pub date: NaiveDate,
    /// Constituent of the previous built date
    pub ticker: String,
    /// What was missing
    pub reason: String,
}

impl std::fmt::Display for PartialDataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.date, self.ticker, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_date_classification() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(IndexError::DataGap { date }.is_per_date());
        assert!(!IndexError::NotFound { date }.is_per_date());
        assert!(!IndexError::Storage(DataError::LockPoisoned).is_per_date());
    }

    #[test]
    fn test_messages() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(
            IndexError::Range { start, end }.to_string(),
            "Invalid date range: 2025-02-01 is after 2025-01-01"
        );

        let warning = PartialDataWarning {
            date: end,
            ticker: "AAA".to_string(),
            reason: "no close".to_string(),
        };
        assert_eq!(warning.to_string(), "2025-01-01 AAA: no close");
    }
}
