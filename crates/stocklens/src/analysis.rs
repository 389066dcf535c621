//! End-to-end analysis orchestration
//!
//! An [`Analyzer`] ties the price history client, the moving average
//! indicators, and the fundamentals aggregator together: one call produces
//! everything a caller needs to present a ticker.

use crate::api::{FundamentalsProvider, PriceBar, RoicClient, YahooFinanceClient};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::indicators::{Crossover, SmaCross, sma_series};
use crate::metrics::MetricsAggregator;
use crate::registry::MetricRegistry;
use crate::table::MetricsTable;
use crate::window::{Lookback, resolve_end_date, window_start};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Ticker symbol (normalized to uppercase)
    pub ticker: String,
    /// Window end date; today (UTC) when omitted
    pub end_date: Option<NaiveDate>,
    /// Price history lookback period
    pub lookback: Lookback,
    /// Trailing window for reported crossovers, in days
    pub crossover_days: u32,
}

impl AnalysisRequest {
    /// Request with the standard one-year window and six-month crossover
    /// reporting
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            end_date: None,
            lookback: Lookback::default(),
            crossover_days: 180,
        }
    }
}

/// Everything produced by one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Daily price bars, oldest first
    pub bars: Vec<PriceBar>,
    /// Short SMA overlay, aligned with `bars`
    pub short_sma: Vec<f64>,
    /// Long SMA overlay, aligned with `bars`
    pub long_sma: Vec<f64>,
    /// Crossover events within the requested trailing window
    pub crossovers: Vec<Crossover>,
    /// Fundamentals table; absent when no metric could be fetched or no
    /// fundamentals provider is configured
    pub metrics: Option<MetricsTable>,
}

/// Stock analyzer combining price trend and fundamentals
pub struct Analyzer {
    config: Arc<AnalysisConfig>,
    yahoo: YahooFinanceClient,
    aggregator: Option<MetricsAggregator>,
}

impl Analyzer {
    /// Create an analyzer from configuration
    ///
    /// The fundamentals table is only produced when the config carries a
    /// ROIC API key; without one, analyses still run but `metrics` stays
    /// absent.
    pub fn new(config: Arc<AnalysisConfig>, registry: MetricRegistry) -> Result<Self> {
        let aggregator = match &config.roic_api_key {
            Some(key) => {
                let provider = Arc::new(RoicClient::with_timeout(
                    key.clone(),
                    config.roic_rate_limit,
                    config.request_timeout,
                )?);
                Some(MetricsAggregator::new(
                    registry,
                    provider,
                    config.cagr_metrics.clone(),
                ))
            }
            None => {
                tracing::warn!("No ROIC API key configured, fundamentals table disabled");
                None
            }
        };

        Ok(Self {
            config,
            yahoo: YahooFinanceClient::new(),
            aggregator,
        })
    }

    /// Create an analyzer with an explicit fundamentals provider
    pub fn with_provider(
        config: Arc<AnalysisConfig>,
        registry: MetricRegistry,
        provider: Arc<dyn FundamentalsProvider>,
    ) -> Self {
        let aggregator =
            MetricsAggregator::new(registry, provider, config.cagr_metrics.clone());
        Self {
            config,
            yahoo: YahooFinanceClient::new(),
            aggregator: Some(aggregator),
        }
    }

    /// Whether a fundamentals provider is configured
    pub fn has_fundamentals(&self) -> bool {
        self.aggregator.is_some()
    }

    /// Run a full analysis for one request
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let ticker = request.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(AnalysisError::InvalidSymbol(
                "ticker must not be empty".to_string(),
            ));
        }

        let window_end = resolve_end_date(request.end_date);
        let start = window_start(window_end, request.lookback);
        tracing::info!("Analyzing {} from {} to {}", ticker, start, window_end);

        let bars = self.yahoo.price_history(&ticker, start, window_end).await?;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let short_sma = sma_series(&closes, self.config.short_sma_period)?;
        let long_sma = sma_series(&closes, self.config.long_sma_period)?;

        let cross = SmaCross::new(self.config.short_sma_period, self.config.long_sma_period)?;
        let crossovers = cross.detect_within(&bars, request.crossover_days)?;

        let metrics = match &self.aggregator {
            Some(aggregator) => {
                let end_year = window_end.year();
                let start_year = end_year - (self.config.metric_years as i32 - 1);
                aggregator
                    .build_metrics_table(&ticker, &self.config.metric_names, start_year, end_year)
                    .await
            }
            None => None,
        };

        Ok(AnalysisReport {
            ticker,
            window_start: start,
            window_end,
            bars,
            short_sma,
            long_sma,
            crossovers,
            metrics,
        })
    }

    /// Build only the fundamentals table for a ticker and year range
    ///
    /// Returns `None` when no provider is configured or no metric could be
    /// fetched.
    pub async fn fundamentals_table(
        &self,
        ticker: &str,
        metric_names: &[String],
        start_year: i32,
        end_year: i32,
    ) -> Option<MetricsTable> {
        match &self.aggregator {
            Some(aggregator) => {
                aggregator
                    .build_metrics_table(ticker, metric_names, start_year, end_year)
                    .await
            }
            None => {
                tracing::warn!("Fundamentals requested but no provider is configured");
                None
            }
        }
    }
}
