//! ROIC API client for fiscal-year fundamentals
//!
//! ROIC exposes financial statement fields through an RQL query endpoint.
//! Responses are row-oriented JSON: the first row is a header, the
//! remaining rows carry `fiscal_year` plus the requested field as columns.
//!
//! Rate limit: 60 requests per minute on the standard plan.

use crate::api::FundamentalsProvider;
use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const ROIC_BASE_URL: &str = "https://api.roic.ai/v1/rql";

/// ROIC API client
pub struct RoicClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl RoicClient {
    /// Create a new ROIC client
    ///
    /// # Arguments
    /// * `api_key` - ROIC API key
    /// * `rate_limit` - Maximum requests per minute
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create a client with a request timeout on the underlying HTTP client
    pub fn with_timeout(
        api_key: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            rate_limiter,
        })
    }

    /// Create from environment variable ROIC_API_KEY
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ROIC_API_KEY").map_err(|_| {
            AnalysisError::ConfigError("ROIC_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key, 60)) // Default provider limit
    }
}

#[async_trait]
impl FundamentalsProvider for RoicClient {
    async fn fetch_metric(
        &self,
        field: &str,
        ticker: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<(i32, f64)>> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let query = rql_query(field, ticker, start_year, end_year);
        tracing::debug!("ROIC query: {}", query);

        let response = self
            .client
            .get(ROIC_BASE_URL)
            .query(&[("query", query.as_str()), ("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AnalysisError::RateLimitExceeded {
                provider: "ROIC".to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(AnalysisError::ProviderError(format!(
                "ROIC API error: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let payload = decode_body(&body)?;
        parse_metric_rows(&payload, field)
    }
}

/// Decode a raw response body as JSON
fn decode_body(body: &str) -> Result<Value> {
    Ok(serde_json::from_str(body)?)
}

/// Build the RQL query for one field over an inclusive fiscal-year range
fn rql_query(field: &str, ticker: &str, start_year: i32, end_year: i32) -> String {
    format!("get({field}(fa_period_reference=range('{start_year}', '{end_year}'))) for('{ticker}')")
}

/// Parse a row-oriented RQL payload into (fiscal year, value) pairs
///
/// The first row is the header. Rows with a null year or null value are
/// dropped (the provider reports years it has no figure for that way);
/// anything else that fails to parse is a malformed payload.
fn parse_metric_rows(payload: &Value, field: &str) -> Result<Vec<(i32, f64)>> {
    let rows = payload
        .as_array()
        .ok_or_else(|| AnalysisError::MalformedResponse("expected an array of rows".to_string()))?;

    let mut iter = rows.iter();
    let header = iter
        .next()
        .and_then(Value::as_array)
        .ok_or_else(|| AnalysisError::MalformedResponse("missing header row".to_string()))?;

    let year_idx = header
        .iter()
        .position(|c| c.as_str() == Some("fiscal_year"))
        .ok_or_else(|| {
            AnalysisError::MalformedResponse("missing fiscal_year column".to_string())
        })?;
    let field_idx = header
        .iter()
        .position(|c| c.as_str() == Some(field))
        .ok_or_else(|| AnalysisError::MalformedResponse(format!("missing {field} column")))?;

    let mut points = Vec::new();
    for row in iter {
        let cells = row.as_array().ok_or_else(|| {
            AnalysisError::MalformedResponse("expected data row to be an array".to_string())
        })?;

        let year_cell = cells.get(year_idx).unwrap_or(&Value::Null);
        let value_cell = cells.get(field_idx).unwrap_or(&Value::Null);
        if year_cell.is_null() || value_cell.is_null() {
            continue;
        }

        let year = cell_as_year(year_cell).ok_or_else(|| {
            AnalysisError::MalformedResponse(format!("unparseable fiscal_year: {year_cell}"))
        })?;
        let value = cell_as_f64(value_cell).ok_or_else(|| {
            AnalysisError::MalformedResponse(format!("unparseable {field} value: {value_cell}"))
        })?;

        points.push((year, value));
    }

    points.sort_by_key(|(year, _)| *year);
    Ok(points)
}

/// Interpret a cell as a fiscal year (integer, possibly string-encoded)
fn cell_as_year(cell: &Value) -> Option<i32> {
    match cell {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(|y| y as i32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interpret a cell as a numeric value (number or string-encoded number)
fn cell_as_f64(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
