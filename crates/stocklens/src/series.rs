//! Per-metric fiscal year series and growth rate calculation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single metric's value per fiscal year, ordered by year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    name: String,
    points: BTreeMap<i32, f64>,
}

impl MetricSeries {
    /// Create a series from year/value pairs
    pub fn new(name: impl Into<String>, points: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            name: name.into(),
            points: points.into_iter().collect(),
        }
    }

    /// Metric name this series belongs to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of fiscal years with a value
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no data points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value for a fiscal year, if present
    pub fn get(&self, year: i32) -> Option<f64> {
        self.points.get(&year).copied()
    }

    /// Earliest year and its value
    pub fn first(&self) -> Option<(i32, f64)> {
        self.points.iter().next().map(|(y, v)| (*y, *v))
    }

    /// Latest year and its value
    pub fn last(&self) -> Option<(i32, f64)> {
        self.points.iter().next_back().map(|(y, v)| (*y, *v))
    }

    /// Iterate over (year, value) pairs in ascending year order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points.iter().map(|(y, v)| (*y, *v))
    }

    /// Fiscal years covered by this series, ascending
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.keys().copied()
    }

    /// Compound annual growth rate between the first and last value, in percent
    ///
    /// The number of year-steps is the entry count minus one. Returns `None`
    /// when there are fewer than two entries or when either endpoint is not
    /// strictly positive; growth is not meaningful across a zero or negative
    /// base.
    pub fn cagr(&self) -> Option<f64> {
        let (_, first) = self.first()?;
        let (_, last) = self.last()?;
        let num_years = self.points.len().saturating_sub(1);

        if num_years == 0 || first <= 0.0 || last <= 0.0 {
            return None;
        }

        Some(((last / first).powf(1.0 / num_years as f64) - 1.0) * 100.0)
    }

    /// Consume the series, returning its year/value map
    pub fn into_points(self) -> BTreeMap<i32, f64> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_series_ordering() {
        let series = MetricSeries::new("net income", vec![(2022, 3.0), (2020, 1.0), (2021, 2.0)]);
        let years: Vec<i32> = series.years().collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
        assert_eq!(series.first(), Some((2020, 1.0)));
        assert_eq!(series.last(), Some((2022, 3.0)));
    }

    #[test]
    fn test_cagr_two_years() {
        // One year-step: 100 -> 121 is 21% growth
        let series = MetricSeries::new("total revenues", vec![(2020, 100.0), (2021, 121.0)]);
        assert_close(series.cagr().unwrap(), 21.0);
    }

    #[test]
    fn test_cagr_ten_percent_over_two_steps() {
        // Two year-steps: sqrt(121/100) = 1.1, i.e. 10% per year
        let series = MetricSeries::new(
            "total revenues",
            vec![(2020, 100.0), (2021, 110.0), (2022, 121.0)],
        );
        assert_close(series.cagr().unwrap(), 10.0);
    }

    #[test]
    fn test_cagr_single_entry_absent() {
        let series = MetricSeries::new("net income", vec![(2020, 100.0)]);
        assert_eq!(series.cagr(), None);
    }

    #[test]
    fn test_cagr_negative_first_value_absent() {
        let series = MetricSeries::new("net income", vec![(2020, -5.0), (2021, 10.0)]);
        assert_eq!(series.cagr(), None);
    }

    #[test]
    fn test_cagr_zero_last_value_absent() {
        let series = MetricSeries::new("net income", vec![(2020, 100.0), (2021, 0.0)]);
        assert_eq!(series.cagr(), None);
    }

    #[test]
    fn test_cagr_empty_absent() {
        let series = MetricSeries::new("net income", Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.cagr(), None);
    }

    #[test]
    fn test_cagr_uses_entry_count_not_year_span() {
        // A gap year does not change the step count
        let series = MetricSeries::new("net income", vec![(2020, 100.0), (2022, 121.0)]);
        assert_close(series.cagr().unwrap(), 21.0);
    }

    #[test]
    fn test_cagr_declining_series() {
        let series = MetricSeries::new("net income", vec![(2020, 100.0), (2021, 81.0)]);
        assert_close(series.cagr().unwrap(), -19.0);
    }
}
