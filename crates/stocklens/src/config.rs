//! Configuration for stock analysis operations

use crate::error::{AnalysisError, Result};
use crate::registry::names;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Default requests per minute against the fundamentals provider
const DEFAULT_ROIC_RATE_LIMIT: u32 = 60;

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Metric names fetched for the fundamentals table, in display order
    pub metric_names: Vec<String>,

    /// Metric names that receive a CAGR column entry
    pub cagr_metrics: HashSet<String>,

    /// Fiscal years of fundamentals to request, ending at the analysis year
    pub metric_years: u32,

    /// Price history window when the request does not specify one
    pub default_lookback_days: u32,

    /// Trailing window in which crossover events are reported
    pub default_crossover_days: u32,

    /// Short simple moving average period (trading days)
    pub short_sma_period: usize,

    /// Long simple moving average period (trading days)
    pub long_sma_period: usize,

    /// ROIC API key (fundamentals are skipped when absent)
    pub roic_api_key: Option<String>,

    /// Maximum requests per minute against the ROIC API
    pub roic_rate_limit: u32,

    /// Request timeout duration
    pub request_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metric_names: default_metric_names(),
            cagr_metrics: default_cagr_metrics(),
            metric_years: 10,
            default_lookback_days: 365,   // 1 year of price history
            default_crossover_days: 180,  // report crossovers from the last 6 months
            short_sma_period: 50,
            long_sma_period: 200,
            roic_api_key: None,
            roic_rate_limit: DEFAULT_ROIC_RATE_LIMIT,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Load the ROIC API key from the `ROIC_API_KEY` environment variable
    ///
    /// Leaves the key unset when the variable is absent; errors when it is
    /// set but blank.
    pub fn with_env_api_key(mut self) -> Result<Self> {
        if let Ok(key) = std::env::var("ROIC_API_KEY") {
            let key = key.trim().to_string();
            if key.is_empty() {
                return Err(AnalysisError::ConfigError(
                    "ROIC_API_KEY is set but empty".to_string(),
                ));
            }
            self.roic_api_key = Some(key);
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.short_sma_period == 0 {
            return Err(AnalysisError::ConfigError(
                "short_sma_period must be greater than 0".to_string(),
            ));
        }

        if self.short_sma_period >= self.long_sma_period {
            return Err(AnalysisError::ConfigError(format!(
                "short_sma_period ({}) must be less than long_sma_period ({})",
                self.short_sma_period, self.long_sma_period
            )));
        }

        if self.metric_years == 0 {
            return Err(AnalysisError::ConfigError(
                "metric_years must be greater than 0".to_string(),
            ));
        }

        if self.default_lookback_days == 0 {
            return Err(AnalysisError::ConfigError(
                "default_lookback_days must be greater than 0".to_string(),
            ));
        }

        if self.roic_rate_limit == 0 {
            return Err(AnalysisError::ConfigError(
                "roic_rate_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Metric names fetched by default, in display order
fn default_metric_names() -> Vec<String> {
    vec![
        names::TOTAL_REVENUES.to_string(),
        names::OPERATING_CASH_FLOW.to_string(),
        names::NET_INCOME.to_string(),
        names::EARNINGS_PER_SHARE.to_string(),
        names::OPERATING_MARGIN.to_string(),
        names::CAPITAL_EXPENDITURES.to_string(),
        names::RETURN_ON_INVESTED_CAPITAL.to_string(),
        names::DILUTED_AVG_SHARES.to_string(),
    ]
}

/// Metrics that get a CAGR column by default
fn default_cagr_metrics() -> HashSet<String> {
    [
        names::TOTAL_REVENUES,
        names::OPERATING_CASH_FLOW,
        names::NET_INCOME,
        names::EARNINGS_PER_SHARE,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Builder for AnalysisConfig
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    metric_names: Option<Vec<String>>,
    cagr_metrics: Option<HashSet<String>>,
    metric_years: Option<u32>,
    default_lookback_days: Option<u32>,
    default_crossover_days: Option<u32>,
    short_sma_period: Option<usize>,
    long_sma_period: Option<usize>,
    roic_api_key: Option<String>,
    roic_rate_limit: Option<u32>,
    request_timeout: Option<Duration>,
}

impl AnalysisConfigBuilder {
    /// Set the metric names fetched for the fundamentals table
    pub fn metric_names(mut self, names: Vec<String>) -> Self {
        self.metric_names = Some(names);
        self
    }

    /// Set the metrics that receive a CAGR column entry
    pub fn cagr_metrics(mut self, metrics: HashSet<String>) -> Self {
        self.cagr_metrics = Some(metrics);
        self
    }

    /// Set how many fiscal years of fundamentals to request
    pub fn metric_years(mut self, years: u32) -> Self {
        self.metric_years = Some(years);
        self
    }

    /// Set the default price history lookback in days
    pub fn default_lookback_days(mut self, days: u32) -> Self {
        self.default_lookback_days = Some(days);
        self
    }

    /// Set the default crossover reporting window in days
    pub fn default_crossover_days(mut self, days: u32) -> Self {
        self.default_crossover_days = Some(days);
        self
    }

    /// Set the short simple moving average period
    pub fn short_sma_period(mut self, period: usize) -> Self {
        self.short_sma_period = Some(period);
        self
    }

    /// Set the long simple moving average period
    pub fn long_sma_period(mut self, period: usize) -> Self {
        self.long_sma_period = Some(period);
        self
    }

    /// Set the ROIC API key
    pub fn roic_api_key(mut self, key: impl Into<String>) -> Self {
        self.roic_api_key = Some(key.into());
        self
    }

    /// Set the ROIC requests-per-minute limit
    pub fn roic_rate_limit(mut self, limit: u32) -> Self {
        self.roic_rate_limit = Some(limit);
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Load the ROIC API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("ROIC_API_KEY") {
            self.roic_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalysisConfig> {
        let defaults = AnalysisConfig::default();

        let config = AnalysisConfig {
            metric_names: self.metric_names.unwrap_or(defaults.metric_names),
            cagr_metrics: self.cagr_metrics.unwrap_or(defaults.cagr_metrics),
            metric_years: self.metric_years.unwrap_or(defaults.metric_years),
            default_lookback_days: self
                .default_lookback_days
                .unwrap_or(defaults.default_lookback_days),
            default_crossover_days: self
                .default_crossover_days
                .unwrap_or(defaults.default_crossover_days),
            short_sma_period: self.short_sma_period.unwrap_or(defaults.short_sma_period),
            long_sma_period: self.long_sma_period.unwrap_or(defaults.long_sma_period),
            roic_api_key: self.roic_api_key,
            roic_rate_limit: self.roic_rate_limit.unwrap_or(defaults.roic_rate_limit),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}
