//! Error types for stock analysis operations

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Data provider request failed
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// No price history for the requested symbol and window
    #[error("No price data for {symbol}: {reason}")]
    NoPriceData {
        symbol: String,
        reason: String,
    },

    /// Rate limit exceeded for a data provider
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Provider payload did not match the expected row layout
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
