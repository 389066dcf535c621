//! Combined fundamentals table keyed by metric name and fiscal year

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One metric row: per-year values plus an optional growth rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Normalized metric name
    pub name: String,
    /// Value per fiscal year; years the provider did not report are absent
    pub values: BTreeMap<i32, f64>,
    /// CAGR in percent, present only for metrics in the configured CAGR
    /// subset and only when the rate was computable
    pub cagr_percent: Option<f64>,
}

/// Two-dimensional metrics table: rows are metrics, columns are fiscal years
///
/// Years are the union of all row years (outer alignment); a row without a
/// value for some year simply has an empty cell there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    years: Vec<i32>,
    rows: Vec<MetricRow>,
}

impl MetricsTable {
    /// Build a table from rows, deriving the year columns as the sorted
    /// union of all row years
    pub fn from_rows(rows: Vec<MetricRow>) -> Self {
        let years: BTreeSet<i32> = rows.iter().flat_map(|r| r.values.keys().copied()).collect();
        Self {
            years: years.into_iter().collect(),
            rows,
        }
    }

    /// Fiscal year columns in ascending order
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Metric rows in their requested order
    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    /// Look up a row by metric name (case-insensitive)
    pub fn row(&self, name: &str) -> Option<&MetricRow> {
        self.rows
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Cell value for a metric and year
    pub fn value(&self, name: &str, year: i32) -> Option<f64> {
        self.row(name).and_then(|r| r.values.get(&year)).copied()
    }

    /// CAGR cell for a metric
    pub fn cagr(&self, name: &str) -> Option<f64> {
        self.row(name).and_then(|r| r.cagr_percent)
    }

    /// Number of metric rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, values: &[(i32, f64)], cagr: Option<f64>) -> MetricRow {
        MetricRow {
            name: name.to_string(),
            values: values.iter().copied().collect(),
            cagr_percent: cagr,
        }
    }

    #[test]
    fn test_years_are_union_of_rows() {
        let table = MetricsTable::from_rows(vec![
            row("total revenues", &[(2020, 1.0), (2021, 2.0)], Some(5.0)),
            row("net income", &[(2021, 3.0), (2022, 4.0)], None),
        ]);

        assert_eq!(table.years(), &[2020, 2021, 2022]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_cell_is_empty_not_error() {
        let table = MetricsTable::from_rows(vec![
            row("total revenues", &[(2020, 1.0)], None),
            row("net income", &[(2021, 3.0)], None),
        ]);

        assert_eq!(table.value("total revenues", 2020), Some(1.0));
        assert_eq!(table.value("total revenues", 2021), None);
        assert_eq!(table.value("net income", 2020), None);
    }

    #[test]
    fn test_row_lookup_case_insensitive() {
        let table = MetricsTable::from_rows(vec![row("net income", &[(2020, 1.0)], Some(2.0))]);
        assert!(table.row("Net Income").is_some());
        assert_eq!(table.cagr("NET INCOME"), Some(2.0));
    }

    #[test]
    fn test_row_order_preserved() {
        let table = MetricsTable::from_rows(vec![
            row("zeta", &[(2020, 1.0)], None),
            row("alpha", &[(2020, 2.0)], None),
        ]);
        let names: Vec<&str> = table.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_table() {
        let table = MetricsTable::from_rows(Vec::new());
        assert!(table.is_empty());
        assert!(table.years().is_empty());
    }
}
