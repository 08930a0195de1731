//! Universe ranking by market capitalization.

use crate::error::{IndexError, Result};
use centum_data::PricePoint;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

/// Index size.
pub const MAX_CONSTITUENTS: usize = 100;

/// Select the largest tickers on a date.
///
/// Only prices whose ticker is in `eligible` take part. Ordering is market
/// cap descending, then symbol ascending. Prices with a non-finite market cap
/// are ignored. Fewer than `max_constituents` candidates is fine; none at all
/// is a [`IndexError::DataGap`].
pub fn rank_universe(
    date: NaiveDate,
    prices: &[PricePoint],
    eligible: &BTreeSet<String>,
    max_constituents: usize,
) -> Result<Vec<String>> {
    let mut candidates: Vec<&PricePoint> = prices
        .iter()
        .filter(|p| eligible.contains(&p.ticker))
        .filter(|p| {
            let finite = p.market_cap.is_finite();
            if !finite {
                debug!(ticker = %p.ticker, date = %date, "ignoring non-finite market cap");
            }
            finite
        })
        .collect();

    if candidates.is_empty() {
        return Err(IndexError::DataGap { date });
    }

    candidates.sort_by(|a, b| by_market_cap(a, b));
    candidates.truncate(max_constituents);

    Ok(candidates.into_iter().map(|p| p.ticker.clone()).collect())
}

fn by_market_cap(a: &PricePoint, b: &PricePoint) -> Ordering {
    b.market_cap
        .total_cmp(&a.market_cap)
        .then_with(|| a.ticker.cmp(&b.ticker))
}

/// Ranks the snapshot's universe for a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniverseRanker {
    max_constituents: usize,
}

impl Default for UniverseRanker {
    fn default() -> Self {
        Self::new(MAX_CONSTITUENTS)
    }
}

impl UniverseRanker {
    /// Create a ranker keeping at most `max_constituents` tickers.
    pub const fn new(max_constituents: usize) -> Self {
        Self { max_constituents }
    }

    /// Configured index size.
    pub const fn max_constituents(&self) -> usize {
        self.max_constituents
    }

    /// Rank the prices of `date`, keeping the configured number of tickers.
    pub fn rank(
        &self,
        date: NaiveDate,
        prices: &[PricePoint],
        eligible: &BTreeSet<String>,
    ) -> Result<Vec<String>> {
        rank_universe(date, prices, eligible, self.max_constituents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn point(ticker: &str, market_cap: f64) -> PricePoint {
        PricePoint::new(ticker, date(), 1.0, market_cap)
    }

    fn all_eligible(prices: &[PricePoint]) -> BTreeSet<String> {
        prices.iter().map(|p| p.ticker.clone()).collect()
    }

    #[test]
    fn test_orders_by_market_cap_descending() {
        let prices = vec![point("AAA", 10.0), point("BBB", 30.0), point("CCC", 20.0)];
        let ranked = rank_universe(date(), &prices, &all_eligible(&prices), 100).unwrap();
        assert_eq!(ranked, vec!["BBB", "CCC", "AAA"]);
    }

    #[test]
    fn test_ties_break_by_symbol() {
        let prices = vec![point("ZZZ", 50.0), point("MMM", 50.0), point("AAA", 50.0)];
        let ranked = rank_universe(date(), &prices, &all_eligible(&prices), 2).unwrap();
        assert_eq!(ranked, vec!["AAA", "MMM"]);
    }

    #[rstest]
    #[case(150, 100)]
    #[case(100, 100)]
    #[case(37, 37)]
    #[case(1, 1)]
    fn test_selection_size(#[case] available: usize, #[case] expected: usize) {
        let prices: Vec<_> = (0..available)
            .map(|i| point(&format!("T{i:03}"), (i + 1) as f64))
            .collect();
        let ranked = rank_universe(date(), &prices, &all_eligible(&prices), MAX_CONSTITUENTS).unwrap();

        assert_eq!(ranked.len(), expected);
        // The largest always makes it in
        assert_eq!(ranked[0], format!("T{:03}", available - 1));
    }

    #[test]
    fn test_ineligible_tickers_are_skipped() {
        let prices = vec![point("AAA", 10.0), point("BBB", 1_000.0)];
        let eligible = BTreeSet::from(["AAA".to_string()]);
        let ranked = rank_universe(date(), &prices, &eligible, 100).unwrap();
        assert_eq!(ranked, vec!["AAA"]);
    }

    #[test]
    fn test_no_eligible_is_data_gap() {
        let prices = vec![point("AAA", 10.0)];
        let result = rank_universe(date(), &prices, &BTreeSet::new(), 100);
        assert!(matches!(result, Err(IndexError::DataGap { date: d }) if d == date()));
    }

    #[test]
    fn test_non_finite_market_cap_ignored() {
        let prices = vec![point("AAA", f64::NAN), point("BBB", 5.0)];
        let ranked = rank_universe(date(), &prices, &all_eligible(&prices), 100).unwrap();
        assert_eq!(ranked, vec!["BBB"]);
    }

    #[test]
    fn test_default_ranker_size() {
        assert_eq!(UniverseRanker::default().max_constituents(), MAX_CONSTITUENTS);
    }

    #[test]
    fn test_ranker_keeps_configured_size() {
        let prices = vec![point("AAA", 10.0), point("BBB", 30.0), point("CCC", 20.0)];
        let ranked = UniverseRanker::new(2)
            .rank(date(), &prices, &all_eligible(&prices))
            .unwrap();
        assert_eq!(ranked, vec!["BBB", "CCC"]);
    }
}
