//! Daily and cumulative index returns.
//!
//! The return of date `D` is earned by the composition of the previous built
//! date `P`:
//!
//! ```text
//! r(D) = sum over t in comp(P) of w(t, P) * (close(t, D) / close(t, P) - 1)
//! ```
//!
//! Terms are summed in symbol order so repeated builds produce bit-identical
//! results.

use crate::error::PartialDataWarning;
use centum_data::{ConstituentWeight, PricePoint};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Closing prices of one date keyed by ticker.
pub type Closes = HashMap<String, f64>;

/// Index closes from a date's price points.
pub fn closes_by_ticker(prices: &[PricePoint]) -> Closes {
    prices
        .iter()
        .map(|p| (p.ticker.clone(), p.close_price))
        .collect()
}

/// A computed daily return and the constituents that had to be left out.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyReturn {
    /// Fractional return
    pub value: f64,
    /// Constituents excluded from the sum
    pub warnings: Vec<PartialDataWarning>,
}

impl DailyReturn {
    /// Return of the first date ever built.
    pub const fn base() -> Self {
        Self {
            value: 0.0,
            warnings: Vec::new(),
        }
    }
}

/// Weighted return of `date` for the composition held since the previous
/// built date.
///
/// A constituent without a usable close on either date is excluded and
/// reported. Its weight is not redistributed.
pub fn daily_return(
    date: NaiveDate,
    held: &[ConstituentWeight],
    previous: &Closes,
    current: &Closes,
) -> DailyReturn {
    let mut ordered: Vec<&ConstituentWeight> = held.iter().collect();
    ordered.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let mut value = 0.0;
    let mut warnings = Vec::new();

    for constituent in ordered {
        let missing = |reason: &str| PartialDataWarning {
            date,
            ticker: constituent.ticker.clone(),
            reason: reason.to_string(),
        };

        let Some(&then) = previous.get(&constituent.ticker) else {
            warnings.push(missing("no close on previous built date"));
            continue;
        };
        let Some(&now) = current.get(&constituent.ticker) else {
            warnings.push(missing("no close on this date"));
            continue;
        };
        if then <= 0.0 || !then.is_finite() || !now.is_finite() {
            warnings.push(missing("unusable close"));
            continue;
        }

        value += constituent.weight * (now / then - 1.0);
    }

    DailyReturn { value, warnings }
}

/// Chain a daily return onto the previous cumulative return.
pub const fn compound(previous_cumulative: f64, daily: f64) -> f64 {
    (1.0 + previous_cumulative) * (1.0 + daily) - 1.0
}

/// Cumulative return of a sequence of daily returns.
pub fn cumulative<I: IntoIterator<Item = f64>>(daily: I) -> f64 {
    daily.into_iter().fold(0.0, compound)
}
