//! Export of built index data.
//!
//! Single datasets render to CSV, JSON or pretty JSON through the
//! [`Exporter`] trait. [`IndexExport`] bundles the three datasets of a date
//! range (performance, composition changes and daily compositions) and
//! writes them as three CSV files or a single JSON document.

use centum_data::{ConstituentWeight, PerformanceRow};
use centum_index::CompositionChange;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty" | "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::PrettyJson => write!(f, "pretty-json"),
        }
    }
}

/// One row of the performance dataset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    /// Built date.
    pub date: NaiveDate,

    /// Fractional daily return.
    pub daily_return: f64,

    /// Compounded return since the first built date.
    pub cumulative_return: f64,
}

impl From<&PerformanceRow> for PerformanceRecord {
    fn from(row: &PerformanceRow) -> Self {
        Self {
            date: row.date,
            daily_return: row.daily_return,
            cumulative_return: row.cumulative_return,
        }
    }
}

/// Direction of a composition change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// Entered the index.
    Added,

    /// Left the index.
    Removed,
}

/// One ticker entering or leaving the index on a date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Built date.
    pub date: NaiveDate,

    /// Ticker symbol.
    pub ticker: String,

    /// Entry or exit.
    pub change: ChangeKind,
}

impl ChangeRecord {
    /// Flatten composition changes, entries before exits within a date.
    pub fn flatten(changes: &[CompositionChange]) -> Vec<Self> {
        changes
            .iter()
            .flat_map(|change| {
                let added = change.entries.iter().map(move |ticker| Self {
                    date: change.date,
                    ticker: ticker.clone(),
                    change: ChangeKind::Added,
                });
                let removed = change.exits.iter().map(move |ticker| Self {
                    date: change.date,
                    ticker: ticker.clone(),
                    change: ChangeKind::Removed,
                });
                added.chain(removed)
            })
            .collect()
    }
}

/// One constituent of a daily composition, weight in percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionRecord {
    /// Built date.
    pub date: NaiveDate,

    /// Ticker symbol.
    pub ticker: String,

    /// Weight in percent, rounded to four decimals.
    pub weight_pct: f64,
}

impl CompositionRecord {
    /// Create a record from a fractional weight.
    pub fn new(date: NaiveDate, constituent: &ConstituentWeight) -> Self {
        Self {
            date,
            ticker: constituent.ticker.clone(),
            weight_pct: round_to(constituent.weight * 100.0, 4),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Serialize records into a CSV string with a header row.
fn csv_string<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn json_string<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<()> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Flat records export as-is: one CSV row per element.
macro_rules! impl_record_exporter {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Exporter for [$record] {
                fn export_to_string(&self, format: ExportFormat) -> Result<String> {
                    match format {
                        ExportFormat::Csv => csv_string(self),
                        _ => json_string(self, format),
                    }
                }
            }
        )+
    };
}

impl_record_exporter!(
    ConstituentWeight,
    PerformanceRow,
    PerformanceRecord,
    ChangeRecord,
    CompositionRecord,
);

impl<T> Exporter for Vec<T>
where
    [T]: Exporter,
{
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        self.as_slice().export_to_string(format)
    }
}

/// Composition changes keep their list shape in JSON and are flattened to
/// one row per ticker in CSV.
impl Exporter for [CompositionChange] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => csv_string(ChangeRecord::flatten(self)),
            _ => json_string(self, format),
        }
    }
}

/// The three datasets of a date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexExport {
    /// First requested date.
    pub start: NaiveDate,

    /// Last requested date.
    pub end: NaiveDate,

    /// When the export was assembled.
    pub generated_at: DateTime<Utc>,

    /// Daily and cumulative returns.
    pub performance: Vec<PerformanceRecord>,

    /// Entries and exits, only for dates with at least one change.
    pub composition_changes: Vec<ChangeRecord>,

    /// Constituents and weights of every built date.
    pub daily_compositions: Vec<CompositionRecord>,
}

impl IndexExport {
    /// Assemble an export from engine query results.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        performance: &[PerformanceRow],
        changes: &[CompositionChange],
        compositions: &[(NaiveDate, Vec<ConstituentWeight>)],
    ) -> Self {
        Self {
            start,
            end,
            generated_at: Utc::now(),
            performance: performance.iter().map(PerformanceRecord::from).collect(),
            composition_changes: ChangeRecord::flatten(changes),
            daily_compositions: compositions
                .iter()
                .flat_map(|(date, constituents)| {
                    constituents
                        .iter()
                        .map(move |c| CompositionRecord::new(*date, c))
                })
                .collect(),
        }
    }

    /// Base file name, `index_export_{start}_{end}_{YYYYmmdd_HHMMSS}`.
    pub fn file_stem(&self) -> String {
        format!(
            "index_export_{}_{}_{}",
            self.start,
            self.end,
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the export into `dir`.
    ///
    /// CSV produces one file per dataset (`{stem}_performance.csv`,
    /// `{stem}_composition_changes.csv`, `{stem}_daily_compositions.csv`);
    /// JSON produces `{stem}.json`. Returns the written paths.
    pub fn write_to_dir(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let stem = self.file_stem();

        let paths = match format {
            ExportFormat::Csv => {
                let performance = dir.join(format!("{stem}_performance.csv"));
                self.performance.export_to_file(&performance, format)?;

                let changes = dir.join(format!("{stem}_composition_changes.csv"));
                self.composition_changes.export_to_file(&changes, format)?;

                let compositions = dir.join(format!("{stem}_daily_compositions.csv"));
                self.daily_compositions.export_to_file(&compositions, format)?;

                vec![performance, changes, compositions]
            }
            ExportFormat::Json | ExportFormat::PrettyJson => {
                let path = dir.join(format!("{stem}.{}", format.extension()));
                self.export_to_file(&path, format)?;
                vec![path]
            }
        };

        info!(files = paths.len(), dir = %dir.display(), "export written");
        Ok(paths)
    }
}

impl Exporter for IndexExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Csv => {
                let mut output = String::new();

                output.push_str(&format!("# Index export: {} to {}\n", self.start, self.end));
                output.push_str("# performance\n");
                output.push_str(&csv_string(&self.performance)?);
                output.push_str("# composition_changes\n");
                output.push_str(&csv_string(&self.composition_changes)?);
                output.push_str("# daily_compositions\n");
                output.push_str(&csv_string(&self.daily_compositions)?);

                Ok(output)
            }
            _ => json_string(self, format),
        }
    }
}
