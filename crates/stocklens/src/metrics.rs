//! Fundamentals aggregation: fetch metric series, align by fiscal year, and
//! annotate growth rates
//!
//! Failures here degrade, never abort: a metric that cannot be fetched is
//! logged and omitted from the table, and only a fully empty result is
//! reported as absent to the caller.

use crate::api::FundamentalsProvider;
use crate::registry::{MetricRegistry, normalize_name};
use crate::series::MetricSeries;
use crate::table::{MetricRow, MetricsTable};
use std::collections::HashSet;
use std::sync::Arc;

/// Fetches and combines fundamental metrics for one ticker at a time
pub struct MetricsAggregator {
    registry: MetricRegistry,
    provider: Arc<dyn FundamentalsProvider>,
    cagr_metrics: HashSet<String>,
}

impl MetricsAggregator {
    /// Create an aggregator over a metric registry and a fundamentals source
    ///
    /// `cagr_metrics` names the metrics whose table rows get a CAGR entry;
    /// names are normalized on the way in.
    pub fn new(
        registry: MetricRegistry,
        provider: Arc<dyn FundamentalsProvider>,
        cagr_metrics: HashSet<String>,
    ) -> Self {
        let cagr_metrics = cagr_metrics.iter().map(|name| normalize_name(name)).collect();
        Self {
            registry,
            provider,
            cagr_metrics,
        }
    }

    /// The metric registry this aggregator resolves names against
    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Fetch one metric's fiscal-year series
    ///
    /// Returns `None` for unknown metric names, provider failures, and empty
    /// responses; each case is logged rather than propagated so a single bad
    /// metric cannot abort a whole aggregation.
    pub async fn fetch_series(
        &self,
        ticker: &str,
        metric_name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Option<MetricSeries> {
        let name = normalize_name(metric_name);
        let Some(field) = self.registry.field(&name) else {
            tracing::warn!("Unknown metric '{}', skipping", name);
            return None;
        };

        match self
            .provider
            .fetch_metric(field, ticker, start_year, end_year)
            .await
        {
            Ok(points) if points.is_empty() => {
                tracing::warn!("No data for metric '{}' on {}", name, ticker);
                None
            }
            Ok(points) => Some(MetricSeries::new(name, points)),
            Err(e) => {
                tracing::warn!("Failed to fetch '{}' for {}: {}", name, ticker, e);
                None
            }
        }
    }

    /// Build the combined metrics table for a ticker
    ///
    /// Rows follow the order of `metric_names`; metrics that cannot be
    /// fetched are omitted. Returns `None` only when no metric produced a
    /// row at all.
    pub async fn build_metrics_table(
        &self,
        ticker: &str,
        metric_names: &[String],
        start_year: i32,
        end_year: i32,
    ) -> Option<MetricsTable> {
        let ticker = ticker.trim().to_uppercase();
        let mut rows = Vec::new();

        for metric_name in metric_names {
            let Some(series) = self
                .fetch_series(&ticker, metric_name, start_year, end_year)
                .await
            else {
                continue;
            };

            let cagr_percent = if self.cagr_metrics.contains(series.name()) {
                series.cagr()
            } else {
                None
            };

            rows.push(MetricRow {
                name: series.name().to_string(),
                values: series.into_points(),
                cagr_percent,
            });
        }

        if rows.is_empty() {
            tracing::warn!("No metrics could be fetched for {}", ticker);
            return None;
        }

        Some(MetricsTable::from_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockFundamentalsProvider;
    use crate::error::AnalysisError;
    use crate::registry::fields;

    fn cagr_set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn metric_list(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn aggregator(mock: MockFundamentalsProvider, cagr: &[&str]) -> MetricsAggregator {
        MetricsAggregator::new(MetricRegistry::new(), Arc::new(mock), cagr_set(cagr))
    }

    #[tokio::test]
    async fn test_fetch_series_known_metric() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .withf(|field, ticker, start, end| {
                field == fields::NET_INCOME && ticker == "AAPL" && *start == 2020 && *end == 2022
            })
            .returning(|_, _, _, _| Ok(vec![(2020, 100.0), (2021, 110.0), (2022, 121.0)]));

        let agg = aggregator(mock, &[]);
        let series = agg.fetch_series("AAPL", "Net Income", 2020, 2022).await.unwrap();

        assert_eq!(series.name(), "net income");
        let years: Vec<i32> = series.years().collect();
        assert!(years.iter().all(|y| (2020..=2022).contains(y)));
        assert_eq!(series.get(2021), Some(110.0));
    }

    #[tokio::test]
    async fn test_fetch_series_unknown_metric_is_absent() {
        // The provider must never be called for an unregistered name
        let mock = MockFundamentalsProvider::new();
        let agg = aggregator(mock, &[]);

        let series = agg.fetch_series("AAPL", "bogus metric", 2020, 2022).await;
        assert!(series.is_none());
    }

    #[tokio::test]
    async fn test_fetch_series_provider_error_is_absent() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .returning(|_, _, _, _| Err(AnalysisError::ProviderError("boom".to_string())));

        let agg = aggregator(mock, &[]);
        let series = agg.fetch_series("AAPL", "net income", 2020, 2022).await;
        assert!(series.is_none());
    }

    #[tokio::test]
    async fn test_fetch_series_empty_response_is_absent() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric().returning(|_, _, _, _| Ok(Vec::new()));

        let agg = aggregator(mock, &[]);
        let series = agg.fetch_series("AAPL", "net income", 2020, 2022).await;
        assert!(series.is_none());
    }

    #[tokio::test]
    async fn test_build_table_skips_unknown_metric() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .withf(|field, _, _, _| field == fields::TOTAL_REVENUES)
            .returning(|_, _, _, _| Ok(vec![(2020, 100.0), (2021, 121.0)]));

        let agg = aggregator(mock, &["total revenues"]);
        let table = agg
            .build_metrics_table(
                "AAPL",
                &metric_list(&["total revenues", "bogus metric"]),
                2020,
                2021,
            )
            .await
            .unwrap();

        assert_eq!(table.len(), 1);
        let row = table.row("total revenues").unwrap();
        assert!((row.cagr_percent.unwrap() - 21.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_build_table_absent_when_all_fail() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .returning(|_, _, _, _| Err(AnalysisError::ProviderError("offline".to_string())));

        let agg = aggregator(mock, &[]);
        let table = agg
            .build_metrics_table(
                "AAPL",
                &metric_list(&["total revenues", "net income"]),
                2020,
                2021,
            )
            .await;

        assert!(table.is_none());
    }

    #[tokio::test]
    async fn test_build_table_absent_for_empty_request() {
        let mock = MockFundamentalsProvider::new();
        let agg = aggregator(mock, &[]);

        let table = agg.build_metrics_table("AAPL", &[], 2020, 2021).await;
        assert!(table.is_none());
    }

    #[tokio::test]
    async fn test_build_table_row_order_follows_request() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .returning(|_, _, _, _| Ok(vec![(2020, 1.0)]));

        let agg = aggregator(mock, &[]);
        let table = agg
            .build_metrics_table(
                "AAPL",
                &metric_list(&["net income", "total revenues"]),
                2020,
                2020,
            )
            .await
            .unwrap();

        let names: Vec<&str> = table.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["net income", "total revenues"]);
    }

    #[tokio::test]
    async fn test_build_table_outer_aligns_years() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .returning(|field, _, _, _| match field {
                f if f == fields::TOTAL_REVENUES => Ok(vec![(2020, 10.0), (2021, 11.0)]),
                _ => Ok(vec![(2021, 5.0), (2022, 6.0)]),
            });

        let agg = aggregator(mock, &[]);
        let table = agg
            .build_metrics_table(
                "AAPL",
                &metric_list(&["total revenues", "net income"]),
                2020,
                2022,
            )
            .await
            .unwrap();

        assert_eq!(table.years(), &[2020, 2021, 2022]);
        assert_eq!(table.value("total revenues", 2022), None);
        assert_eq!(table.value("net income", 2020), None);
        assert_eq!(table.value("net income", 2021), Some(5.0));
    }

    #[tokio::test]
    async fn test_build_table_cagr_only_for_subset() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .returning(|_, _, _, _| Ok(vec![(2020, 100.0), (2021, 121.0)]));

        let agg = aggregator(mock, &["net income"]);
        let table = agg
            .build_metrics_table(
                "AAPL",
                &metric_list(&["net income", "earnings per share"]),
                2020,
                2021,
            )
            .await
            .unwrap();

        assert!(table.cagr("net income").is_some());
        assert!(table.cagr("earnings per share").is_none());
    }

    #[tokio::test]
    async fn test_build_table_non_computable_cagr_leaves_cell_empty() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .returning(|_, _, _, _| Ok(vec![(2021, 100.0)]));

        let agg = aggregator(mock, &["net income"]);
        let table = agg
            .build_metrics_table("AAPL", &metric_list(&["net income"]), 2021, 2021)
            .await
            .unwrap();

        // Row survives; only the growth cell stays empty
        assert_eq!(table.len(), 1);
        assert!(table.cagr("net income").is_none());
    }

    #[tokio::test]
    async fn test_build_table_uppercases_ticker() {
        let mut mock = MockFundamentalsProvider::new();
        mock.expect_fetch_metric()
            .withf(|_, ticker, _, _| ticker == "AAPL")
            .returning(|_, _, _, _| Ok(vec![(2020, 1.0)]));

        let agg = aggregator(mock, &[]);
        let table = agg
            .build_metrics_table("aapl", &metric_list(&["net income"]), 2020, 2020)
            .await;

        assert!(table.is_some());
    }
}
