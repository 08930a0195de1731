//! Composition changes between consecutive built dates.

use crate::error::{IndexError, Result};
use crate::snapshot::IndexLedger;
use centum_data::ConstituentWeight;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tickers that entered and left the index on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionChange {
    /// Built date
    pub date: NaiveDate,
    /// Present on `date` but not on the previous built date, sorted
    pub entries: Vec<String>,
    /// Present on the previous built date but not on `date`, sorted
    pub exits: Vec<String>,
}

impl CompositionChange {
    /// Whether the composition was unchanged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.exits.is_empty()
    }
}

/// Compare the composition of `date` with the previous built composition.
///
/// Without a previous composition every constituent is an entry.
pub fn diff(
    date: NaiveDate,
    previous: Option<&[ConstituentWeight]>,
    current: &[ConstituentWeight],
) -> CompositionChange {
    let current: BTreeSet<&str> = current.iter().map(|c| c.ticker.as_str()).collect();
    let previous: BTreeSet<&str> = previous
        .unwrap_or_default()
        .iter()
        .map(|c| c.ticker.as_str())
        .collect();

    CompositionChange {
        date,
        entries: current.difference(&previous).map(|t| t.to_string()).collect(),
        exits: previous.difference(&current).map(|t| t.to_string()).collect(),
    }
}

/// Changes for every built date in `[start, end]`, ascending.
///
/// The first date of the range is compared with the built date immediately
/// before it, not with an empty composition. Dates without changes are
/// included with empty lists.
pub fn composition_changes<L: IndexLedger + ?Sized>(
    ledger: &L,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<CompositionChange>> {
    if start > end {
        return Err(IndexError::Range { start, end });
    }

    let mut previous = match ledger.previous_built_date(start)? {
        Some(date) => ledger.composition(date)?,
        None => None,
    };

    let mut changes = Vec::new();
    for date in ledger.built_dates(start, end)? {
        let current = ledger
            .composition(date)?
            .ok_or(IndexError::NotFound { date })?;
        changes.push(diff(date, previous.as_deref(), &current));
        previous = Some(current);
    }

    Ok(changes)
}
