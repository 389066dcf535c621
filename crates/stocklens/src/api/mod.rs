//! API clients for stock data providers

pub mod roic;
pub mod yahoo;

pub use roic::RoicClient;
pub use yahoo::{PriceBar, YahooFinanceClient};

use crate::error::Result;
use async_trait::async_trait;

/// Fiscal-year fundamentals source
///
/// One call covers a single provider field for a ticker across an inclusive
/// fiscal-year range. Implementations perform blocking I/O per call; the
/// aggregator issues calls sequentially.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// Fetch `field` for `ticker`, returning (fiscal year, value) pairs in
    /// ascending year order
    async fn fetch_metric(
        &self,
        field: &str,
        ticker: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<(i32, f64)>>;
}
