//! Yahoo Finance price history client

use crate::error::{AnalysisError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

/// One daily OHLC price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Fetch daily price bars for a symbol over an inclusive date range
    ///
    /// Fails with [`AnalysisError::NoPriceData`] when the range contains no
    /// trading data at all.
    pub async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| AnalysisError::YahooFinanceError(e.to_string()))?;

        // The end date is inclusive, so query up to the following midnight
        let end_exclusive = end.checked_add_days(Days::new(1)).unwrap_or(end);
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end_exclusive.and_time(NaiveTime::MIN).and_utc().timestamp();

        // Convert chrono timestamps to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start_ts).map_err(|e| {
            AnalysisError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end_ts)
            .map_err(|e| AnalysisError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| AnalysisError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| AnalysisError::YahooFinanceError(e.to_string()))?;

        if quotes.is_empty() {
            return Err(AnalysisError::NoPriceData {
                symbol: symbol.to_string(),
                reason: format!("no quotes between {start} and {end}"),
            });
        }

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .map(|q| PriceBar {
                date: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .map(|dt| dt.date_naive())
                    .unwrap_or_else(|| Utc::now().date_naive()),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adjclose: q.adjclose,
            })
            .collect();

        // Indicator math assumes chronological order
        bars.sort_by_key(|b| b.date);

        Ok(bars)
    }
}
