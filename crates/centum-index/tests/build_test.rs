//! Integration tests for index construction over a SQLite store

use approx::assert_abs_diff_eq;
use centum_data::{PricePoint, SqliteStore, Ticker};
use centum_index::query;
use centum_index::returns::cumulative;
use centum_index::{IndexBuilder, IndexError};
use chrono::NaiveDate;
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

/// 120 tickers over ten weekdays. Market caps drift so the top 100 rotates.
fn market(store: &SqliteStore) {
    let tickers: Vec<_> = (0..120).map(|i| Ticker::new(format!("T{i:03}"))).collect();
    store.upsert_tickers(&tickers).unwrap();

    let days = [2, 3, 6, 7, 8, 9, 10, 13, 14, 15];
    let mut points = Vec::new();
    for (n, day) in days.iter().enumerate() {
        for i in 0..120u32 {
            // Every 7th ticker skips a day now and then
            if i % 7 == 0 && n % 3 == 2 {
                continue;
            }
            let drift = if i % 2 == 0 { 1.0 + 0.01 * n as f64 } else { 1.0 - 0.008 * n as f64 };
            let close = (50.0 + f64::from(i)) * drift;
            let shares = 1_000.0 + f64::from((i * 37) % 120);
            points.push(PricePoint::new(format!("T{i:03}"), d(*day), close, close * shares));
        }
    }
    store.insert_prices(&points).unwrap();
}

fn market_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    market(&store);
    store
}

#[test]
fn test_weights_sum_to_one_and_size_is_capped() {
    let store = market_store();
    let report = IndexBuilder::new(&store).build(d(1), d(31)).unwrap();
    assert_eq!(report.dates_built.len(), 10);

    for date in &report.dates_built {
        let composition = query::composition(&store, *date).unwrap();
        let eligible = store.eligible_tickers(*date).unwrap();

        assert_eq!(composition.len(), eligible.len().min(100));
        let total: f64 = composition.iter().map(|c| c.weight).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_cumulative_matches_compounded_daily_returns() {
    let store = market_store();
    IndexBuilder::new(&store).build(d(1), d(31)).unwrap();

    let rows = query::performance(&store, d(1), d(31)).unwrap();
    assert_eq!(rows[0].daily_return, 0.0);

    for (i, row) in rows.iter().enumerate() {
        let expected = cumulative(rows[..=i].iter().map(|r| r.daily_return));
        assert_abs_diff_eq!(row.cumulative_return, expected, epsilon = 1e-9);
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let store = market_store();
    IndexBuilder::new(&store).build(d(1), d(31)).unwrap();
    let first_perf = query::performance(&store, d(1), d(31)).unwrap();
    let first_comp = query::composition(&store, d(9)).unwrap();

    IndexBuilder::new(&store).build(d(1), d(31)).unwrap();
    assert_eq!(query::performance(&store, d(1), d(31)).unwrap(), first_perf);
    assert_eq!(query::composition(&store, d(9)).unwrap(), first_comp);
    assert_eq!(store.get_stats().unwrap().built_dates, 10);
}

#[test]
fn test_sub_range_rebuild_continues_the_chain() {
    let store = market_store();
    IndexBuilder::new(&store).build(d(1), d(31)).unwrap();
    let full = query::performance(&store, d(1), d(31)).unwrap();

    // Later built dates are folded again after the range
    let report = IndexBuilder::new(&store).build(d(8), d(10)).unwrap();
    assert_eq!(report.dates_built, vec![d(8), d(9), d(10), d(13), d(14), d(15)]);

    let rebuilt = query::performance(&store, d(1), d(31)).unwrap();
    for (a, b) in full.iter().zip(&rebuilt) {
        assert_eq!(a.date, b.date);
        assert_abs_diff_eq!(a.cumulative_return, b.cumulative_return, epsilon = 1e-12);
    }
}

#[test]
fn test_incremental_build_equals_full_build() {
    let full = market_store();
    IndexBuilder::new(&full).build(d(1), d(31)).unwrap();

    let incremental = market_store();
    IndexBuilder::new(&incremental).build(d(1), d(7)).unwrap();
    IndexBuilder::new(&incremental).build(d(8), d(31)).unwrap();

    assert_eq!(
        query::performance(&full, d(1), d(31)).unwrap(),
        query::performance(&incremental, d(1), d(31)).unwrap()
    );
}

/// Every stored cumulative return compounds the daily returns from the
/// first built date.
fn assert_chain_consistent(store: &SqliteStore) {
    let rows = query::performance(store, d(1), d(31)).unwrap();
    assert_eq!(rows[0].daily_return, 0.0);
    for (i, row) in rows.iter().enumerate() {
        let expected = cumulative(rows[..=i].iter().map(|r| r.daily_return));
        assert_abs_diff_eq!(row.cumulative_return, expected, epsilon = 1e-9);
    }
}

#[rstest]
#[case(vec![(d(8), d(31)), (d(1), d(7))])]
#[case(vec![(d(13), d(15)), (d(6), d(10)), (d(1), d(3))])]
#[case(vec![(d(14), d(14)), (d(1), d(31))])]
fn test_out_of_order_builds_equal_full_build(#[case] ranges: Vec<(NaiveDate, NaiveDate)>) {
    let full = market_store();
    IndexBuilder::new(&full).build(d(1), d(31)).unwrap();

    let store = market_store();
    for (start, end) in ranges {
        IndexBuilder::new(&store).build(start, end).unwrap();
    }

    assert_chain_consistent(&store);
    assert_eq!(
        query::performance(&full, d(1), d(31)).unwrap(),
        query::performance(&store, d(1), d(31)).unwrap()
    );
    assert_eq!(
        query::composition(&full, d(15)).unwrap(),
        query::composition(&store, d(15)).unwrap()
    );
}

#[test]
fn test_changes_reconstruct_compositions() {
    let store = market_store();
    IndexBuilder::new(&store).build(d(1), d(31)).unwrap();

    let changes = query::composition_changes(&store, d(1), d(31)).unwrap();
    assert_eq!(changes.len(), 10);

    let mut holding: BTreeSet<String> = BTreeSet::new();
    for change in changes {
        let entries: BTreeSet<_> = change.entries.iter().cloned().collect();
        let exits: BTreeSet<_> = change.exits.iter().cloned().collect();
        assert!(entries.is_disjoint(&exits));

        holding.retain(|t| !exits.contains(t));
        holding.extend(entries);

        let actual: BTreeSet<String> = query::composition(&store, change.date)
            .unwrap()
            .into_iter()
            .map(|c| c.ticker)
            .collect();
        assert_eq!(holding, actual);
    }
}

#[test]
fn test_missing_constituent_price_warns() {
    let store = market_store();
    let report = IndexBuilder::new(&store).build(d(1), d(31)).unwrap();

    // Every 7th ticker skips the third, sixth and ninth trading day
    assert!(!report.warnings.is_empty());
    for warning in &report.warnings {
        let n: u32 = warning.ticker[1..].parse().unwrap();
        assert_eq!(n % 7, 0);
        assert!([d(6), d(9), d(14)].contains(&warning.date));
    }
    assert!(report.is_complete());
}

#[rstest]
#[case(d(2), d(2), 1)]
#[case(d(6), d(10), 5)]
#[case(d(4), d(5), 0)]
fn test_build_counts(#[case] start: NaiveDate, #[case] end: NaiveDate, #[case] expected: usize) {
    let store = market_store();
    let report = IndexBuilder::new(&store).build(start, end).unwrap();
    assert_eq!(report.dates_built.len(), expected);
}

#[test]
fn test_replacement_scenario() {
    let store = SqliteStore::in_memory().unwrap();
    store
        .upsert_tickers(&[Ticker::new("AAA"), Ticker::new("BBB"), Ticker::new("CCC")])
        .unwrap();
    store
        .insert_prices(&[
            PricePoint::new("AAA", d(1), 100.0, 500.0),
            PricePoint::new("BBB", d(1), 50.0, 400.0),
            PricePoint::new("AAA", d(2), 100.0, 500.0),
            PricePoint::new("CCC", d(2), 20.0, 450.0),
        ])
        .unwrap();

    let report = IndexBuilder::new(&store).build(d(1), d(2)).unwrap();

    // BBB has no close on the second day, so only AAA earns a return
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].ticker, "BBB");

    let changes = query::composition_changes(&store, d(2), d(2)).unwrap();
    assert_eq!(changes[0].entries, vec!["CCC"]);
    assert_eq!(changes[0].exits, vec!["BBB"]);
}

#[test]
fn test_concurrent_builds_share_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("centum.db");

    let store = Arc::new(SqliteStore::new(&path).unwrap());
    market(&store);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || IndexBuilder::new(&*store).build(d(1), d(31)).unwrap())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_complete());
    }

    let rows = query::performance(&*store, d(1), d(31)).unwrap();
    assert_eq!(rows.len(), 10);
    for date in rows.iter().map(|r| r.date) {
        let total: f64 = query::composition(&*store, date)
            .unwrap()
            .iter()
            .map(|c| c.weight)
            .sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_overlapping_concurrent_builds_converge() {
    let full = market_store();
    IndexBuilder::new(&full).build(d(1), d(31)).unwrap();
    let expected = query::performance(&full, d(1), d(31)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(dir.path().join("centum.db")).unwrap());
    market(&store);

    let ranges = [(d(1), d(28)), (d(14), d(28)), (d(7), d(9)), (d(1), d(28))];
    let handles: Vec<_> = ranges
        .into_iter()
        .map(|(start, end)| {
            let store = Arc::clone(&store);
            thread::spawn(move || IndexBuilder::new(&*store).build(start, end).unwrap())
        })
        .collect();
    for handle in handles {
        assert!(!handle.join().unwrap().aborted());
    }

    assert_chain_consistent(&store);
    assert_eq!(query::performance(&*store, d(1), d(31)).unwrap(), expected);
}

#[test]
fn test_inverted_queries_are_range_errors() {
    let store = market_store();
    assert!(matches!(
        query::composition_changes(&store, d(9), d(2)),
        Err(IndexError::Range { .. })
    ));
}

#[test]
fn test_single_ticker_has_no_changes_after_first_day() {
    let store = SqliteStore::in_memory().unwrap();
    store.upsert_ticker(&Ticker::new("AAA")).unwrap();
    store
        .insert_prices(&[
            PricePoint::new("AAA", d(1), 100.0, 1e9),
            PricePoint::new("AAA", d(2), 110.0, 1.1e9),
        ])
        .unwrap();

    IndexBuilder::new(&store).build(d(1), d(2)).unwrap();

    let rows = query::performance(&store, d(1), d(2)).unwrap();
    assert_abs_diff_eq!(rows[1].daily_return, 0.10, epsilon = 1e-12);
    assert_abs_diff_eq!(rows[1].cumulative_return, 0.10, epsilon = 1e-12);

    let changes = query::composition_changes(&store, d(2), d(2)).unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes[0].is_empty());
}
