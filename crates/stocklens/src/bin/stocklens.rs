//! stocklens CLI
//!
//! Command-line front end for price trend and fundamentals analysis.
//!
//! # Usage
//!
//! ```bash
//! # Optional: enables the fundamentals table
//! export ROIC_API_KEY="your-key"
//!
//! cargo run --bin stocklens -- analyze AAPL
//! cargo run --bin stocklens -- analyze AAPL --end-date 2024-06-01 --lookback-quarters 2
//! cargo run --bin stocklens -- metrics AAPL --start-year 2015 --end-year 2024
//! cargo run --bin stocklens -- list-metrics
//! ```

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use std::env;
use std::sync::Arc;
use stocklens::{
    AnalysisConfig, AnalysisReport, AnalysisRequest, Analyzer, CrossKind, Lookback,
    MetricRegistry, MetricsTable,
};

#[derive(Parser)]
#[command(name = "stocklens", version, about = "Price trend and fundamentals snapshot for a ticker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full analysis: price window, SMA crossovers, fundamentals table
    Analyze {
        /// Ticker symbol
        ticker: String,
        /// Window end date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Lookback window in days
        #[arg(long, conflicts_with = "lookback_quarters")]
        lookback_days: Option<u32>,
        /// Lookback window in quarters
        #[arg(long)]
        lookback_quarters: Option<u32>,
        /// Report crossovers from this many trailing days
        #[arg(long)]
        crossover_days: Option<u32>,
    },
    /// Fundamentals table only
    Metrics {
        /// Ticker symbol
        ticker: String,
        /// First fiscal year of the range
        #[arg(long)]
        start_year: Option<i32>,
        /// Last fiscal year of the range (defaults to the current year)
        #[arg(long)]
        end_year: Option<i32>,
        /// Metric to fetch, repeatable (defaults to the built-in list)
        #[arg(long = "metric")]
        metrics: Vec<String>,
    },
    /// List registered metric names and provider fields
    ListMetrics,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn,stocklens=info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(AnalysisConfig::default().with_env_api_key()?);

    match cli.command {
        Command::Analyze {
            ticker,
            end_date,
            lookback_days,
            lookback_quarters,
            crossover_days,
        } => {
            let analyzer = Analyzer::new(Arc::clone(&config), MetricRegistry::new())?;

            let lookback = match (lookback_days, lookback_quarters) {
                (_, Some(quarters)) => Lookback::Quarters(quarters),
                (Some(days), None) => Lookback::Days(days),
                (None, None) => Lookback::Days(config.default_lookback_days),
            };
            let request = AnalysisRequest {
                ticker,
                end_date,
                lookback,
                crossover_days: crossover_days.unwrap_or(config.default_crossover_days),
            };

            let report = analyzer.run(&request).await?;
            print_report(&report, &config);
        }

        Command::Metrics {
            ticker,
            start_year,
            end_year,
            metrics,
        } => {
            let analyzer = Analyzer::new(Arc::clone(&config), MetricRegistry::new())?;

            let end_year = end_year.unwrap_or_else(|| Utc::now().year());
            let start_year = start_year.unwrap_or(end_year - (config.metric_years as i32 - 1));
            anyhow::ensure!(
                start_year <= end_year,
                "start year ({start_year}) must not be after end year ({end_year})"
            );

            let names = if metrics.is_empty() {
                config.metric_names.clone()
            } else {
                metrics
            };

            match analyzer
                .fundamentals_table(&ticker, &names, start_year, end_year)
                .await
            {
                Some(table) => println!("{}", render_metrics_table(&table)),
                None => anyhow::bail!("no metrics available for {ticker}"),
            }
        }

        Command::ListMetrics => {
            let registry = MetricRegistry::new();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["Metric", "Provider field"]);
            for name in registry.names() {
                table.add_row(vec![name, registry.field(name).unwrap_or("")]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

fn print_report(report: &AnalysisReport, config: &AnalysisConfig) {
    println!();
    println!(
        "{} ({} to {}, {} trading days)",
        report.ticker,
        report.window_start,
        report.window_end,
        report.bars.len()
    );

    if let (Some(first), Some(last)) = (report.bars.first(), report.bars.last()) {
        let change = (last.close - first.close) / first.close * 100.0;
        println!(
            "Close {:.2} to {:.2} ({:+.2}%)",
            first.close, last.close, change
        );
    }

    if let (Some(short), Some(long)) = (report.short_sma.last(), report.long_sma.last()) {
        let stance = if short > long { "above" } else { "below" };
        println!(
            "SMA {}/{}: short is {} long ({:.2} vs {:.2})",
            config.short_sma_period, config.long_sma_period, stance, short, long
        );
    }

    println!();
    if report.crossovers.is_empty() {
        println!("No SMA crossovers in the reporting window");
    } else {
        for event in &report.crossovers {
            let label = match event.kind {
                CrossKind::Golden => "Golden cross",
                CrossKind::Death => "Death cross",
            };
            println!(
                "{}  {}  (short {:.2}, long {:.2})",
                event.date, label, event.short, event.long
            );
        }
    }

    println!();
    match &report.metrics {
        Some(table) => println!("{}", render_metrics_table(table)),
        None => {
            if config.roic_api_key.is_none() {
                println!("Fundamentals unavailable: set ROIC_API_KEY to enable the metrics table");
            } else {
                println!("Fundamentals unavailable: no metric could be fetched");
            }
        }
    }
}

fn render_metrics_table(table: &MetricsTable) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Metric")];
    header.extend(table.years().iter().map(Cell::new));
    header.push(Cell::new("CAGR %"));
    out.set_header(header);

    for row in table.rows() {
        let mut cells = vec![Cell::new(&row.name)];
        for year in table.years() {
            let text = row
                .values
                .get(year)
                .map(|v| format_value(*v))
                .unwrap_or_default();
            cells.push(Cell::new(text));
        }
        cells.push(Cell::new(
            row.cagr_percent
                .map(|v| format!("{v:.2}"))
                .unwrap_or_default(),
        ));
        out.add_row(cells);
    }

    out
}

/// Compact display for large monetary values
fn format_value(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        format!("{value:.2}")
    }
}
