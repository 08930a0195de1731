//! Performance summary over a range of built dates.

use centum_data::PerformanceRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Return of a single date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DayReturn {
    /// Built date.
    pub date: NaiveDate,

    /// Fractional daily return.
    pub daily_return: f64,
}

/// Summary statistics of the index over a range.
///
/// Statistics are computed from the range's own daily returns. The total
/// return therefore starts at the first row of the range, unlike the stored
/// cumulative return which compounds from the first date ever built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceSummary {
    /// First built date in the range.
    pub period_start: NaiveDate,

    /// Last built date in the range.
    pub period_end: NaiveDate,

    /// Number of built dates.
    pub days: usize,

    /// Compounded return over the range.
    pub total_return: f64,

    /// Stored cumulative return on the last date.
    pub ending_cumulative_return: f64,

    /// Mean daily return.
    pub mean_daily_return: f64,

    /// Sample standard deviation of daily returns.
    pub daily_volatility: f64,

    /// Largest peak-to-trough decline of the compounded value, as a positive
    /// fraction.
    pub max_drawdown: f64,

    /// Best day.
    pub best_day: DayReturn,

    /// Worst day.
    pub worst_day: DayReturn,
}

impl PerformanceSummary {
    /// Summarize performance rows ordered by date. `None` when empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use centum_data::PerformanceRow;
    /// use centum_output::PerformanceSummary;
    /// use chrono::NaiveDate;
    ///
    /// let rows = vec![
    ///     PerformanceRow {
    ///         date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
    ///         daily_return: 0.0,
    ///         cumulative_return: 0.0,
    ///     },
    ///     PerformanceRow {
    ///         date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
    ///         daily_return: 0.10,
    ///         cumulative_return: 0.10,
    ///     },
    /// ];
    ///
    /// let summary = PerformanceSummary::from_rows(&rows).unwrap();
    /// assert_eq!(summary.days, 2);
    /// assert!((summary.total_return - 0.10).abs() < 1e-12);
    /// ```
    pub fn from_rows(rows: &[PerformanceRow]) -> Option<Self> {
        let first = rows.first()?;
        let last = rows.last()?;

        let n = rows.len() as f64;
        let mean = rows.iter().map(|r| r.daily_return).sum::<f64>() / n;
        let variance = if rows.len() > 1 {
            rows.iter()
                .map(|r| (r.daily_return - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0)
        } else {
            0.0
        };

        let mut value = 1.0_f64;
        let mut peak = 1.0_f64;
        let mut max_drawdown = 0.0_f64;
        for row in rows {
            value *= 1.0 + row.daily_return;
            peak = peak.max(value);
            max_drawdown = max_drawdown.max(1.0 - value / peak);
        }

        let day = |r: &PerformanceRow| DayReturn {
            date: r.date,
            daily_return: r.daily_return,
        };
        let best = rows
            .iter()
            .max_by(|a, b| a.daily_return.total_cmp(&b.daily_return))
            .map(day)?;
        let worst = rows
            .iter()
            .min_by(|a, b| a.daily_return.total_cmp(&b.daily_return))
            .map(day)?;

        Some(Self {
            period_start: first.date,
            period_end: last.date,
            days: rows.len(),
            total_return: value - 1.0,
            ending_cumulative_return: last.cumulative_return,
            mean_daily_return: mean,
            daily_volatility: variance.sqrt(),
            max_drawdown,
            best_day: best,
            worst_day: worst,
        })
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nIndex Performance\n");
        output.push_str(&format!(
            "Period: {} to {} ({} days)\n",
            self.period_start, self.period_end, self.days
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "  Total Return:             {:>10.2}%\n",
            self.total_return * 100.0
        ));
        output.push_str(&format!(
            "  Cumulative (inception):   {:>10.2}%\n",
            self.ending_cumulative_return * 100.0
        ));
        output.push_str(&format!(
            "  Mean Daily Return:        {:>10.4}%\n",
            self.mean_daily_return * 100.0
        ));
        output.push_str(&format!(
            "  Daily Volatility:         {:>10.4}%\n",
            self.daily_volatility * 100.0
        ));
        output.push_str(&format!(
            "  Max Drawdown:             {:>10.2}%\n",
            self.max_drawdown * 100.0
        ));
        output.push_str(&format!(
            "  Best Day:                 {:>10.2}% ({})\n",
            self.best_day.daily_return * 100.0,
            self.best_day.date
        ));
        output.push_str(&format!(
            "  Worst Day:                {:>10.2}% ({})\n",
            self.worst_day.daily_return * 100.0,
            self.worst_day.date
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Index Performance\n\n");
        output.push_str(&format!(
            "**Period:** {} to {} ({} days)\n\n",
            self.period_start, self.period_end, self.days
        ));
        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!(
            "| Total Return | {:.2}% |\n",
            self.total_return * 100.0
        ));
        output.push_str(&format!(
            "| Cumulative (inception) | {:.2}% |\n",
            self.ending_cumulative_return * 100.0
        ));
        output.push_str(&format!(
            "| Mean Daily Return | {:.4}% |\n",
            self.mean_daily_return * 100.0
        ));
        output.push_str(&format!(
            "| Daily Volatility | {:.4}% |\n",
            self.daily_volatility * 100.0
        ));
        output.push_str(&format!(
            "| Max Drawdown | {:.2}% |\n",
            self.max_drawdown * 100.0
        ));
        output.push_str(&format!(
            "| Best Day | {:.2}% ({}) |\n",
            self.best_day.daily_return * 100.0,
            self.best_day.date
        ));
        output.push_str(&format!(
            "| Worst Day | {:.2}% ({}) |\n",
            self.worst_day.daily_return * 100.0,
            self.worst_day.date
        ));

        output
    }
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Index Performance ({} to {})",
            self.period_start, self.period_end
        )?;
        writeln!(f, "  Total Return: {:.2}%", self.total_return * 100.0)?;
        writeln!(f, "  Volatility: {:.4}%", self.daily_volatility * 100.0)?;
        writeln!(f, "  Max Drawdown: {:.2}%", self.max_drawdown * 100.0)?;
        Ok(())
    }
}
