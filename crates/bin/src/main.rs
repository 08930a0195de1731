//! Centum CLI binary.
//!
//! Builds, queries and exports the equal-weighted top-100 index.

mod progress;
mod store_manager;

use centum::universe::{SeedUniverse, Universe};
use centum::{IndexService, Settings};
use centum_data::{ConstituentWeight, PerformanceRow};
use centum_index::{BuildReport, CompositionChange};
use centum_output::{ExportFormat, Exporter, PerformanceSummary};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use store_manager::Overrides;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "centum")]
#[command(about = "Centum: equal-weighted index of the 100 largest US stocks", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (default: ./centum.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index for every trading date in a range
    Build {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Number of constituents
        #[arg(long)]
        max_constituents: Option<usize>,
    },

    /// Show the composition of a built date
    Composition {
        /// Built date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Output format (text, csv, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show daily and cumulative returns
    Performance {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Output format (text, csv, json; markdown with --summary)
        #[arg(long, default_value = "text")]
        format: String,

        /// Print summary statistics instead of daily rows
        #[arg(long)]
        summary: bool,
    },

    /// Show constituents entering and leaving the index
    Changes {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Output format (text, csv, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write performance, changes and compositions to files
    Export {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// File format (csv, json, pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Output directory, overriding the configured one
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Fetch closes for every registered ticker on one date
    Ingest {
        /// Run date (default: today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Register tickers and load recent price history
    Bootstrap {
        /// Comma-separated symbols (default: built-in large-cap list)
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Calendar days of history
        #[arg(long)]
        days: Option<u32>,
    },

    /// Show store statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Terminal table, Markdown, or one of the export formats.
enum QueryFormat {
    Text,
    Markdown,
    Export(ExportFormat),
}

impl QueryFormat {
    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Ok(Self::Export(other.parse()?)),
        }
    }

    /// The export format, with Markdown rendered as the terminal table.
    const fn tabular(&self) -> Option<ExportFormat> {
        match self {
            Self::Export(format) => Some(*format),
            Self::Text | Self::Markdown => None,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "centum=debug" } else { "centum=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = Overrides {
        database_path: cli.db,
        max_constituents: match &cli.command {
            Commands::Build {
                max_constituents, ..
            } => *max_constituents,
            _ => None,
        },
    };
    let mut settings = store_manager::resolve_settings(cli.config.as_deref(), overrides)?;

    match cli.command {
        Commands::Build { start, end, .. } => {
            let service = store_manager::open_service(&settings)?;
            build_index(&service, start, end)?;
        }
        Commands::Composition { date, format } => {
            let service = store_manager::open_service(&settings)?;
            show_composition(&service, date, &QueryFormat::parse(&format)?)?;
        }
        Commands::Performance {
            start,
            end,
            format,
            summary,
        } => {
            let service = store_manager::open_service(&settings)?;
            if summary {
                show_summary(&service, start, end, &QueryFormat::parse(&format)?)?;
            } else {
                show_performance(&service, start, end, &QueryFormat::parse(&format)?)?;
            }
        }
        Commands::Changes { start, end, format } => {
            let service = store_manager::open_service(&settings)?;
            show_changes(&service, start, end, &QueryFormat::parse(&format)?)?;
        }
        Commands::Export {
            start,
            end,
            format,
            out,
        } => {
            let service = store_manager::open_service(&settings)?;
            let paths = service.export_to_dir(start, end, format, out.as_deref())?;
            println!("Wrote {} file(s):", paths.len());
            for path in paths {
                println!("  {}", path.display());
            }
        }
        Commands::Ingest { date } => {
            let service = store_manager::open_service(&settings)?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let summary = service.ingest_daily(date).await?;
            println!(
                "Ingested {}: {} of {} rows inserted for {} tickers",
                date, summary.rows_inserted, summary.rows_priced, summary.symbols_requested
            );
            print_unpriced(&summary.unpriced);
        }
        Commands::Bootstrap { symbols, days } => {
            if let Some(days) = days {
                settings.ingest.history_days = days;
            }
            let service = store_manager::open_service(&settings)?;
            bootstrap(&service, &settings, symbols).await?;
        }
        Commands::Stats { json } => {
            let service = store_manager::open_service(&settings)?;
            show_stats(&service, &settings, json)?;
        }
    }

    Ok(())
}

fn build_index(
    service: &IndexService,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Building index from {} to {} ({} constituents)",
        start,
        end,
        service.settings().index.max_constituents
    );

    let pb = progress::build_bar()?;
    let report = service.build_index_with_observer(start, end, |phase| {
        progress::on_phase(&pb, phase);
    })?;
    if !pb.is_finished() {
        pb.finish_and_clear();
    }

    print_report(&report);
    if report.aborted() {
        return Err("build stopped by a storage failure".into());
    }
    Ok(())
}

fn print_report(report: &BuildReport) {
    println!("\nBuilt {} date(s)", report.dates_built.len());
    if let (Some(first), Some(last)) = (report.dates_built.first(), report.dates_built.last()) {
        println!("  Range: {} to {}", first, last);
    }

    if !report.errors.is_empty() {
        println!("\nErrors ({}):", report.errors.len());
        for (date, error) in &report.errors {
            println!("  {}: {}", date, error);
        }
    }

    if !report.warnings.is_empty() {
        println!("\nPartial data warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }
}

fn show_composition(
    service: &IndexService,
    date: NaiveDate,
    format: &QueryFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let composition = service.get_composition(date)?;

    match format.tabular() {
        Some(format) => print!("{}", composition.export_to_string(format)?),
        None => print_composition(date, &composition),
    }
    Ok(())
}

fn print_composition(date: NaiveDate, composition: &[ConstituentWeight]) {
    println!("Composition on {} ({} constituents)", date, composition.len());
    println!("{}", "=".repeat(30));
    for (i, c) in composition.iter().enumerate() {
        println!("{:>4}  {:<8} {:>8.4}%", i + 1, c.ticker, c.weight * 100.0);
    }
}

fn show_performance(
    service: &IndexService,
    start: NaiveDate,
    end: NaiveDate,
    format: &QueryFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = service.get_performance(start, end)?;

    match format.tabular() {
        Some(format) => print!("{}", rows.export_to_string(format)?),
        None => print_performance(&rows),
    }
    Ok(())
}

fn print_performance(rows: &[PerformanceRow]) {
    if rows.is_empty() {
        println!("No built dates in range");
        return;
    }

    println!("{:<12} {:>12} {:>14}", "Date", "Daily", "Cumulative");
    println!("{}", "-".repeat(40));
    for row in rows {
        println!(
            "{:<12} {:>11.4}% {:>13.4}%",
            row.date,
            row.daily_return * 100.0,
            row.cumulative_return * 100.0
        );
    }
}

fn show_summary(
    service: &IndexService,
    start: NaiveDate,
    end: NaiveDate,
    format: &QueryFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(summary) = service.performance_summary(start, end)? else {
        println!("No built dates in range");
        return Ok(());
    };

    match format {
        QueryFormat::Text => print!("{}", summary.to_ascii_table()),
        QueryFormat::Markdown => print!("{}", summary.to_markdown()),
        QueryFormat::Export(ExportFormat::Json) => {
            println!("{}", serde_json::to_string(&summary)?);
        }
        QueryFormat::Export(ExportFormat::PrettyJson) => {
            println!("{}", serde_json::to_string_pretty::<PerformanceSummary>(&summary)?);
        }
        QueryFormat::Export(ExportFormat::Csv) => {
            return Err("summary is available as text, markdown or json".into());
        }
    }
    Ok(())
}

fn show_changes(
    service: &IndexService,
    start: NaiveDate,
    end: NaiveDate,
    format: &QueryFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let changes = service.get_composition_changes(start, end)?;

    match format.tabular() {
        Some(format) => print!("{}", changes.export_to_string(format)?),
        None => print_changes(&changes),
    }
    Ok(())
}

fn print_changes(changes: &[CompositionChange]) {
    let changed: Vec<_> = changes.iter().filter(|c| !c.is_empty()).collect();
    if changed.is_empty() {
        println!("No composition changes in range");
        return;
    }

    for change in changed {
        println!("{}", change.date);
        if !change.entries.is_empty() {
            println!("  + {}", change.entries.join(", "));
        }
        if !change.exits.is_empty() {
            println!("  - {}", change.exits.join(", "));
        }
    }
}

async fn bootstrap(
    service: &IndexService,
    settings: &Settings,
    symbols: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let universe = if symbols.is_empty() {
        SeedUniverse::new()
    } else {
        SeedUniverse::from_symbols(symbols)
    };

    println!(
        "Bootstrapping {} symbols with {} days of history",
        universe.size(),
        settings.ingest.history_days
    );

    let end = Utc::now().date_naive();
    let summary = service.bootstrap(&universe.symbols(), end).await?;
    println!(
        "Registered {} tickers, inserted {} of {} price rows",
        summary.tickers_registered, summary.rows_inserted, summary.rows_priced
    );
    print_unpriced(&summary.unpriced);
    Ok(())
}

fn print_unpriced(unpriced: &[String]) {
    if !unpriced.is_empty() {
        println!(
            "Skipped {} symbol(s) without shares outstanding: {}",
            unpriced.len(),
            unpriced.join(", ")
        );
    }
}

fn show_stats(
    service: &IndexService,
    settings: &Settings,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = service.stats()?;

    if as_json {
        let output = json!({
            "database_path": settings.database_path.display().to_string(),
            "tickers": stats.tickers,
            "active_tickers": stats.active_tickers,
            "price_rows": stats.price_rows,
            "price_dates": stats.price_dates,
            "built_dates": stats.built_dates,
            "composition_rows": stats.composition_rows,
            "first_built": stats.first_built.map(|d| d.to_string()),
            "last_built": stats.last_built.map(|d| d.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Centum store");
        println!("============\n");
        store_manager::print_store_info(settings, &stats);
    }
    Ok(())
}
