//! Read access to the built index.

use crate::differ::{self, CompositionChange};
use crate::error::{IndexError, Result};
use crate::snapshot::IndexLedger;
use centum_data::{ConstituentWeight, PerformanceRow};
use chrono::NaiveDate;

/// Composition of a built date, sorted by ticker.
pub fn composition<L: IndexLedger + ?Sized>(
    ledger: &L,
    date: NaiveDate,
) -> Result<Vec<ConstituentWeight>> {
    let mut rows = ledger
        .composition(date)?
        .ok_or(IndexError::NotFound { date })?;
    rows.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    Ok(rows)
}

/// Performance of every built date in `[start, end]`, ascending.
///
/// Unbuilt dates are simply absent.
pub fn performance<L: IndexLedger + ?Sized>(
    ledger: &L,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PerformanceRow>> {
    if start > end {
        return Err(IndexError::Range { start, end });
    }
    ledger.performance_range(start, end)
}

/// Entries and exits for every built date in `[start, end]`.
pub fn composition_changes<L: IndexLedger + ?Sized>(
    ledger: &L,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CompositionChange>> {
    differ::composition_changes(ledger, start, end)
}
