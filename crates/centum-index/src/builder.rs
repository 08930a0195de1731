//! Date-by-date index construction.
//!
//! A build is a fold over the trading dates of a range. The fold state is the
//! previous built date's composition, closes and cumulative return; it is
//! seeded from the ledger's latest built date before the range. Dates built
//! earlier but lying after the range are folded again, so the chain always
//! compounds from the first built date no matter in which order ranges are
//! built. Builds on one ledger are serialized.
//!
//! Each date walks through [`BuildPhase::Ranking`], [`BuildPhase::Weighting`]
//! and [`BuildPhase::Persisting`]. A date with market data but no eligible
//! ticker keeps the previous built date's composition; without one it is
//! reported as a [`IndexError::DataGap`] and skipped. A storage failure stops
//! the build; dates committed before it are kept.

use crate::error::{IndexError, PartialDataWarning, Result};
use crate::ranker::UniverseRanker;
use crate::returns::{Closes, DailyReturn, closes_by_ticker, compound, daily_return};
use crate::snapshot::{IndexLedger, MarketSnapshot};
use crate::weights::equal_weights;
use centum_data::{ConstituentWeight, IndexDay};
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Where a build currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Range resolved, nothing processed yet
    Pending {
        /// Trading dates in the range
        dates: usize,
    },
    /// Selecting the constituents of a date
    Ranking(NaiveDate),
    /// Assigning weights and computing the return of a date
    Weighting(NaiveDate),
    /// Committing a date
    Persisting(NaiveDate),
    /// Every date processed
    Done,
    /// Stopped by a storage failure
    Error,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending { dates } => write!(f, "pending ({dates} dates)"),
            Self::Ranking(date) => write!(f, "ranking {date}"),
            Self::Weighting(date) => write!(f, "weighting {date}"),
            Self::Persisting(date) => write!(f, "persisting {date}"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome of a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Dates committed, ascending, including later dates folded again
    pub dates_built: Vec<NaiveDate>,
    /// Dates that failed and why
    pub errors: Vec<(NaiveDate, IndexError)>,
    /// Constituents left out of a daily return
    pub warnings: Vec<PartialDataWarning>,
}

impl BuildReport {
    /// Whether the build stopped on a storage failure before reaching the
    /// end of the range.
    pub fn aborted(&self) -> bool {
        self.errors.iter().any(|(_, e)| !e.is_per_date())
    }

    /// Whether every trading date in the range was built.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fold state carried from one built date to the next.
#[derive(Debug)]
struct Chain {
    composition: Vec<ConstituentWeight>,
    closes: Closes,
    cumulative: f64,
}

/// Callback notified on every phase transition.
pub type PhaseObserver<'a> = Box<dyn Fn(&BuildPhase) + Send + Sync + 'a>;

/// Builds and persists the index over a date range.
pub struct IndexBuilder<'a, S: ?Sized> {
    store: &'a S,
    ranker: UniverseRanker,
    observer: Option<PhaseObserver<'a>>,
}

impl<S: ?Sized> fmt::Debug for IndexBuilder<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("ranker", &self.ranker)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, S> IndexBuilder<'a, S>
where
    S: MarketSnapshot + IndexLedger + ?Sized,
{
    /// Create a builder over a store with the default index size.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            ranker: UniverseRanker::default(),
            observer: None,
        }
    }

    /// Set the maximum number of constituents.
    pub fn with_max_constituents(mut self, max_constituents: usize) -> Self {
        self.ranker = UniverseRanker::new(max_constituents);
        self
    }

    /// Register a callback for phase transitions.
    pub fn with_observer(mut self, observer: impl Fn(&BuildPhase) + Send + Sync + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn enter(&self, phase: BuildPhase) {
        debug!(phase = %phase, "build phase");
        if let Some(observer) = &self.observer {
            observer(&phase);
        }
    }

    /// Build every trading date in `[start, end]`.
    ///
    /// Only an invalid range or a storage failure before the first date is
    /// returned as an error. Failures at individual dates are collected in
    /// the report.
    pub fn build(&self, start: NaiveDate, end: NaiveDate) -> Result<BuildReport> {
        if start > end {
            return Err(IndexError::Range { start, end });
        }

        let _lock = self.store.lock_builds()?;

        let mut dates = self.store.trading_dates(start, end)?;
        let later = self.store.built_dates_after(end)?;
        if !later.is_empty() {
            debug!(dates = later.len(), after = %end, "folding later built dates again");
        }
        dates.extend(later);

        self.enter(BuildPhase::Pending { dates: dates.len() });
        info!(start = %start, end = %end, dates = dates.len(), "building index");

        let mut chain = self.seed(start)?;
        let mut report = BuildReport::default();

        for date in dates {
            match self.build_date(date, chain.as_ref()) {
                Ok((next, warnings)) => {
                    for warning in &warnings {
                        warn!(date = %warning.date, ticker = %warning.ticker, reason = %warning.reason, "partial data");
                    }
                    report.warnings.extend(warnings);
                    report.dates_built.push(date);
                    chain = Some(next);
                }
                Err(e) if e.is_per_date() => {
                    warn!(date = %date, error = %e, "skipping date");
                    report.errors.push((date, e));
                }
                Err(e) => {
                    error!(date = %date, error = %e, "build stopped");
                    report.errors.push((date, e));
                    self.enter(BuildPhase::Error);
                    return Ok(report);
                }
            }
        }

        self.enter(BuildPhase::Done);
        info!(
            built = report.dates_built.len(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "index build finished"
        );

        Ok(report)
    }

    /// Restore the fold state from the latest built date before `start`.
    fn seed(&self, start: NaiveDate) -> Result<Option<Chain>> {
        let Some(previous) = self.store.previous_built_date(start)? else {
            return Ok(None);
        };

        let composition = self.store.composition(previous)?.unwrap_or_default();
        let cumulative = self
            .store
            .performance(previous)?
            .map_or(0.0, |row| row.cumulative_return);
        let closes = closes_by_ticker(&self.store.prices_for_date(previous)?);

        debug!(date = %previous, cumulative, "resuming return chain");
        Ok(Some(Chain {
            composition,
            closes,
            cumulative,
        }))
    }

    fn build_date(
        &self,
        date: NaiveDate,
        chain: Option<&Chain>,
    ) -> Result<(Chain, Vec<PartialDataWarning>)> {
        self.enter(BuildPhase::Ranking(date));
        let prices = self.store.prices_for_date(date)?;
        let eligible = self.store.eligible_tickers(date)?;
        let constituents = match (self.ranker.rank(date, &prices, &eligible), chain) {
            (Ok(selected), _) => equal_weights(&selected),
            (Err(IndexError::DataGap { .. }), Some(prev)) => {
                warn!(
                    date = %date,
                    constituents = prev.composition.len(),
                    "no eligible tickers, keeping previous composition"
                );
                prev.composition.clone()
            }
            (Err(e), _) => return Err(e),
        };

        self.enter(BuildPhase::Weighting(date));
        let closes = closes_by_ticker(&prices);
        let (daily, cumulative, warnings) = match chain {
            Some(prev) => {
                let DailyReturn { value, warnings } =
                    daily_return(date, &prev.composition, &prev.closes, &closes);
                (value, compound(prev.cumulative, value), warnings)
            }
            None => {
                let base = DailyReturn::base();
                (base.value, base.value, base.warnings)
            }
        };

        self.enter(BuildPhase::Persisting(date));
        let day = IndexDay {
            date,
            constituents,
            daily_return: daily,
            cumulative_return: cumulative,
        };
        self.store.commit_day(&day)?;
        debug!(
            date = %date,
            constituents = day.constituents.len(),
            daily_return = daily,
            cumulative_return = cumulative,
            "date committed"
        );

        Ok((
            Chain {
                composition: day.constituents,
                closes,
                cumulative,
            },
            warnings,
        ))
    }
}
