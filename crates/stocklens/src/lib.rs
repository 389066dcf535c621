//! Stock trend and fundamentals analysis
//!
//! This crate fetches price history and company financial metrics for a
//! ticker and computes derived indicators. It includes:
//!
//! - Daily price history from Yahoo Finance
//! - Simple moving average overlays and golden/death cross detection
//! - Fiscal-year fundamentals from the ROIC API
//! - A combined metrics table with per-metric CAGR for a configured subset
//!
//! Fundamentals aggregation degrades rather than fails: metrics that cannot
//! be fetched are logged and omitted, and the table is absent only when no
//! metric was usable at all.
//!
//! # Example
//!
//! ```rust,ignore
//! use stocklens::{AnalysisConfig, AnalysisRequest, Analyzer, MetricRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(AnalysisConfig::default().with_env_api_key()?);
//!     let analyzer = Analyzer::new(config, MetricRegistry::new())?;
//!
//!     let report = analyzer.run(&AnalysisRequest::new("AAPL")).await?;
//!     println!("{} crossovers found", report.crossovers.len());
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod registry;
pub mod series;
pub mod table;
pub mod window;

// Re-export main types for convenience
pub use analysis::{AnalysisReport, AnalysisRequest, Analyzer};
pub use api::{FundamentalsProvider, PriceBar, RoicClient, YahooFinanceClient};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use indicators::{CrossKind, Crossover, SmaCross};
pub use metrics::MetricsAggregator;
pub use registry::MetricRegistry;
pub use series::MetricSeries;
pub use table::{MetricRow, MetricsTable};
pub use window::Lookback;
